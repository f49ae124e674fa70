use crate::error::Error;
use crate::Generator;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tinylink_core::ShortId;
use typed_builder::TypedBuilder;

/// Configures a [`TokenGenerator`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct TokenSettings {
    /// Random bytes drawn per candidate.
    #[builder(default = 6)]
    pub entropy_bytes: usize,
    /// Length of the emitted id. The encoded token is truncated to this.
    #[builder(default = 8)]
    pub length: usize,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Generates random short ids from the thread-local CSPRNG.
///
/// Each candidate is `entropy_bytes` random bytes encoded as unpadded
/// URL-safe base64 and truncated to `length`. The defaults (6 bytes,
/// 8 characters) use every encoded character, giving 48 bits per id.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    settings: TokenSettings,
}

impl TokenGenerator {
    pub fn new(settings: TokenSettings) -> Result<Self, Error> {
        if settings.entropy_bytes == 0 {
            return Err(Error::NoEntropy);
        }

        let max_length = encoded_len(settings.entropy_bytes).min(ShortId::MAX_LEN);
        if settings.length == 0 || settings.length > max_length {
            return Err(Error::InvalidLength {
                length: settings.length,
                entropy_bytes: settings.entropy_bytes,
                max_length,
            });
        }

        Ok(Self { settings })
    }

    pub fn next_token(&self) -> String {
        let mut bytes = vec![0u8; self.settings.entropy_bytes];
        rand::rng().fill_bytes(&mut bytes);

        let mut token = URL_SAFE_NO_PAD.encode(&bytes);
        token.truncate(self.settings.length);
        token
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self {
            settings: TokenSettings::default(),
        }
    }
}

impl Generator for TokenGenerator {
    type Output = ShortId;

    fn generate(&self) -> Self::Output {
        // The URL-safe base64 alphabet is a subset of the short id alphabet.
        ShortId::new_unchecked(self.next_token())
    }
}

/// Characters produced by unpadded base64 for `bytes` input bytes.
fn encoded_len(bytes: usize) -> usize {
    (bytes * 4).div_ceil(3)
}
