pub mod mcstructure;
pub mod template;
