mod cleanup;
mod html_text;
mod pdf_text;
mod run;
#[cfg(test)]
mod tests;

pub use run::run;
