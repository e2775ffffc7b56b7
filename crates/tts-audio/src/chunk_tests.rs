use super::*;

#[test]
fn empty_text_yields_no_chunks() {
    assert!(chunk_text("").is_empty());
    assert!(chunk_text("   \n\t  ").is_empty());
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = chunk_text("Hello there. How are you?");
    assert_eq!(chunks, vec!["Hello there. How are you?"]);
}

#[test]
fn whitespace_is_normalized_before_chunking() {
    let chunks = chunk_text("Hello   there.\n\nHow   are you?");
    assert_eq!(chunks, vec!["Hello there. How are you?"]);
}

#[test]
fn no_chunk_exceeds_the_configured_maximum() {
    let long = "word ".repeat(500);
    for chunk in chunk_text_with_max(&long, 40) {
        assert!(chunk.len() <= 40, "chunk too long: {chunk:?} ({})", chunk.len());
    }
}

#[test]
fn rejoining_chunks_with_single_spaces_recovers_normalized_text() {
    let text = "One. Two! Three? Four.";
    let chunks = chunk_text_with_max(text, 10);
    assert!(chunks.len() > 1, "expected the text to actually split");
    assert_eq!(chunks.join(" "), text);
}

#[test]
fn a_single_word_longer_than_the_limit_is_sliced() {
    let word = "a".repeat(250);
    let chunks = chunk_text_with_max(&word, 200);
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].len() <= 200);
    assert_eq!(chunks.concat(), word);
}

#[test]
fn sentence_boundaries_are_preferred_over_mid_sentence_splits() {
    let text = "Short sentence one. Short sentence two.";
    let chunks = chunk_text_with_max(text, 25);
    for chunk in &chunks {
        assert!(chunk.ends_with('.'), "split mid-sentence: {chunk:?}");
    }
}
