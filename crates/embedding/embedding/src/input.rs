//! Turns [`EmbedInput`] into the text handed to a backend.

use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::types::EmbedInput;

/// Resolves one input: text verbatim, or the UTF-8 contents of the referenced file.
/// Empty or whitespace-only text is rejected.
pub async fn resolve_input(input: &EmbedInput) -> Result<String> {
    let text = match input {
        EmbedInput::Text(text) => text.clone(),
        EmbedInput::File(path) => {
            let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                EmbeddingError::Input(format!("cannot read {}: {}", path.display(), e))
            })?;
            debug!(path = %path.display(), text_len = text.len(), "resolved file input");
            text
        }
    };

    if text.trim().is_empty() {
        let what = match input {
            EmbedInput::Text(_) => "text input".to_string(),
            EmbedInput::File(path) => format!("file {}", path.display()),
        };
        return Err(EmbeddingError::Input(format!("{what} is empty")));
    }
    Ok(text)
}

/// Resolves a batch in order; the first bad item fails the whole batch.
pub async fn resolve_inputs(inputs: &[EmbedInput]) -> Result<Vec<String>> {
    let mut texts = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let text = resolve_input(input).await.map_err(|e| match e {
            EmbeddingError::Input(msg) => {
                EmbeddingError::Input(format!("batch item {index}: {msg}"))
            }
            other => other,
        })?;
        texts.push(text);
    }
    Ok(texts)
}

/// Log-safe prefix of `text`, cut on a char boundary.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_is_returned_verbatim() {
        let text = resolve_input(&EmbedInput::text("  hello ")).await.unwrap();
        assert_eq!(text, "  hello ");
    }

    #[tokio::test]
    async fn blank_text_is_an_input_error() {
        for blank in ["", "   ", "\n\t"] {
            let err = resolve_input(&EmbedInput::text(blank)).await.unwrap_err();
            assert!(matches!(err, EmbeddingError::Input(_)), "{blank:?}");
        }
    }

    #[tokio::test]
    async fn file_contents_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "c").unwrap();
        assert_eq!(resolve_input(&EmbedInput::file(&path)).await.unwrap(), "c");
    }

    #[tokio::test]
    async fn missing_or_blank_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            resolve_input(&EmbedInput::file(&missing)).await,
            Err(EmbeddingError::Input(_))
        ));

        let blank = dir.path().join("blank.txt");
        std::fs::write(&blank, "  \n").unwrap();
        assert!(matches!(
            resolve_input(&EmbedInput::file(&blank)).await,
            Err(EmbeddingError::Input(_))
        ));
    }

    #[tokio::test]
    async fn batch_error_names_the_item() {
        let inputs = vec![EmbedInput::text("a"), EmbedInput::text(" ")];
        let err = resolve_inputs(&inputs).await.unwrap_err();
        assert!(err.to_string().contains("batch item 1"), "{err}");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé...");
        assert_eq!(preview("hi", 200), "hi");
    }
}
