mod blog;
mod category;
mod faq;
mod inquiry;
mod media;
mod pagination;
mod product;
mod show_case;
mod subscriber;

pub use blog::*;
pub use category::*;
pub use faq::*;
pub use inquiry::*;
pub use media::*;
pub use pagination::*;
pub use product::*;
pub use show_case::*;
pub use subscriber::*;
