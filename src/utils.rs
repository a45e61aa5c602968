use rand::Rng;

pub const DEFAULT_TOKEN_LENGTH: usize = 6;

/// Uppercase, lowercase, digits and eight symbols: 70 characters.
pub const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Random display token for signup emails. Characters are drawn uniformly
/// with replacement; not suitable as a credential.
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_has_seventy_distinct_characters() {
        let mut chars = TOKEN_ALPHABET.to_vec();
        chars.sort_unstable();
        chars.dedup();

        assert_eq!(TOKEN_ALPHABET.len(), 70);
        assert_eq!(chars.len(), 70);
    }

    #[test]
    fn token_has_requested_length_and_alphabet() {
        for length in [1, DEFAULT_TOKEN_LENGTH, 32] {
            let token = generate_token(length);

            assert_eq!(token.chars().count(), length);
            assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn zero_length_yields_empty_token() {
        assert!(generate_token(0).is_empty());
    }
}
