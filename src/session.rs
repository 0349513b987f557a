/// Editor session owning the overlay collection.
pub mod editor;
