pub mod address_book;
pub mod classifier;
pub mod normalizer;
pub mod profiler;

pub use address_book::AddressBook;
pub use classifier::Classifier;
pub use normalizer::normalize_record;
