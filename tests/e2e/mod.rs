// End-to-end tests for the Judge Voice Backend API
//
// Each test gets its own server bound to an ephemeral port. Repositories and
// object storage are in-memory fakes seeded with fixtures, and the voice
// provider is the real PPIO client talking to a stub transport, so retries,
// preprocessing and the REST surface run exactly as in production.
//
// Pacing is disabled so batch endpoints answer immediately.

mod helpers;
mod test_comments;
mod test_tts;
