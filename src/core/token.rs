use crate::domain::model::Token;
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const TOKEN_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 使用 thread-local CSPRNG 產生 token
    pub fn generate(&self) -> Token {
        self.generate_with(&mut rand::rng())
    }

    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> Token {
        let token: String = (0..TOKEN_LENGTH)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Token::new(token)
    }
}
