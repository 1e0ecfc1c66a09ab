/*!
 * Main test entry point for the webwright test suite
 */

// Import common test utilities
pub mod common;

// Import integration tests
mod integration {
    // End-to-end markup-to-page workflow tests
    pub mod page_workflow_tests;

    // Config loading and override tests
    pub mod config_tests;
}
