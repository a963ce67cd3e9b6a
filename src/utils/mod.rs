pub mod locale;
pub mod rich_text;
