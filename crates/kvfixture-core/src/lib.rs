pub mod model;
pub mod spec;
pub mod tensor;
pub mod versions;

pub use model::*;
pub use spec::*;
pub use tensor::*;
pub use versions::*;
