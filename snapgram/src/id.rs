use nanoid::nanoid;

/// Canonical alphabet for document identifiers (no ambiguous glyphs).
const DOCUMENT_ID_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
/// Default document id length.
const DOCUMENT_ID_LENGTH: usize = 20;

/// Generates a new document identifier for posts, comments, rooms, messages and notifications.
///
/// User profiles are keyed by the identity provider's user id instead.
pub fn generate_document_id() -> String {
    nanoid!(DOCUMENT_ID_LENGTH, DOCUMENT_ID_ALPHABET)
}
