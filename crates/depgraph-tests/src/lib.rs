pub mod registry;

// Re-export key testing utilities
pub use depgraph_lib::testing::TempDirFixture;
pub use registry::{MockRegistry, PageLayout};
