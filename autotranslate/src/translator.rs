//! The seam to an external translation service.
//!
//! The crate never talks to a network itself; callers hand in something
//! implementing [`Translator`]. Closures with the right signature qualify,
//! which is what the tests use.

use crate::error::Error;

/// Default number of strings sent per request.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Batch translation capability.
///
/// Implementations must return exactly one translated string per input
/// string, in input order.
pub trait Translator {
    fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, Error>;
}

impl<F> Translator for F
where
    F: Fn(&[String], &str, &str) -> Result<Vec<String>, Error>,
{
    fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, Error> {
        self(texts, source_language, target_language)
    }
}

/// Translates `texts` in sequential chunks of at most `chunk_size` strings
/// and concatenates the results in order.
///
/// `on_chunk(done, total)` is called before each request with the number of
/// strings already translated. The first failing chunk aborts the whole call;
/// no partial result is returned.
pub fn translate_in_chunks<T, F>(
    translator: &T,
    texts: &[String],
    source_language: &str,
    target_language: &str,
    chunk_size: usize,
    mut on_chunk: F,
) -> Result<Vec<String>, Error>
where
    T: Translator + ?Sized,
    F: FnMut(usize, usize),
{
    let chunk_size = chunk_size.max(1);
    let mut translations = Vec::with_capacity(texts.len());

    for (idx, chunk) in texts.chunks(chunk_size).enumerate() {
        let done = idx * chunk_size;
        on_chunk(done, texts.len());
        tracing::debug!(
            offset = done,
            size = chunk.len(),
            source_language,
            target_language,
            "translating chunk"
        );

        let translated = translator.translate_batch(chunk, source_language, target_language)?;
        if translated.len() != chunk.len() {
            return Err(Error::gateway_error(
                format!(
                    "expected {} translations for strings {}..{}, got {}",
                    chunk.len(),
                    done,
                    done + chunk.len(),
                    translated.len()
                ),
                None,
            ));
        }
        translations.extend(translated);
    }

    Ok(translations)
}
