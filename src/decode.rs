//! Incremental UTF-8 decoding of body chunks.
//!
//! Network chunk boundaries do not respect character boundaries, so a
//! multi-byte character may arrive split over two chunks. [`Utf8Decoder`]
//! holds the incomplete tail back until the rest of it arrives.

use crate::client::ClientError;

/// Streaming UTF-8 decoder.
///
/// Invalid sequences decode to U+FFFD. An incomplete sequence at the end of
/// a chunk is carried into the next call.
///
/// # Example
/// ```
/// use lessonstream::decode::Utf8Decoder;
///
/// let mut decoder = Utf8Decoder::new();
/// let bytes = "héllo".as_bytes();
/// let mut text = decoder.decode(&bytes[..2]);
/// text.push_str(&decoder.decode(&bytes[2..]));
/// assert_eq!(text, "héllo");
/// assert!(decoder.finish().is_ok());
/// ```
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, returning every complete character it finishes.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix is UTF-8
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending.extend_from_slice(after);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Whether an incomplete character is buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// End of input. Fails if a character was left incomplete.
    pub fn finish(self) -> Result<(), ClientError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Decode(format!(
                "stream ended inside a UTF-8 sequence ({} dangling bytes)",
                self.pending.len()
            )))
        }
    }
}
