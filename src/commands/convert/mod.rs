mod assemble;
mod classify;
mod normalize;
mod run;
mod segment;

pub use assemble::{MASTER_INDEX_FILE, chapter_file_name};
pub use run::run;
