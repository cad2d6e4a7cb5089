/// Builds one window of `cs` word indices per position of `words`.
///
/// The sentence is padded with `cs / 2` copies of `pad` on both sides and
/// window `i` is `padded[i..i + cs]`, so for odd `cs` each window is centred
/// on its word. `pad` is normally the vocabulary size, which addresses the
/// extra padding row at the end of the embedding table.
///
/// # Panics
/// If `cs` is zero.
pub fn context_window(words: &[usize], cs: usize, pad: usize) -> Vec<Vec<usize>> {
    assert!(cs >= 1, "context window size must be at least 1");

    let half = cs / 2;
    let mut padded = Vec::with_capacity(words.len() + 2 * half);
    padded.extend(std::iter::repeat(pad).take(half));
    padded.extend_from_slice(words);
    padded.extend(std::iter::repeat(pad).take(half));

    (0..words.len())
        .map(|i| padded[i..i + cs].to_vec())
        .collect()
}
