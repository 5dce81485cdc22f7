// Adapters layer: concrete bindings for external systems. The enrollment
// core only sees these through the domain ports.

pub mod webdriver;
