mod report_test;

use std::{cell::RefCell, path::PathBuf};

use crate::diagnostics::Diagnostics;

/// Keeps every message so tests can assert on what was reported.
#[derive(Default)]
pub struct RecordingDiagnostics {
    infos: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn infos(&self) -> Vec<String> {
        self.infos.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn info(&self, message: &str) {
        self.infos.borrow_mut().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

/// A path in the system temp directory, unique per process and test.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("flowtag-{}-{}", std::process::id(), name))
}

/// A version 2 flow log record with the given destination port and protocol.
pub fn flow_line(dstport: &str, protocol: &str) -> String {
    format!(
        "2 123456789012 eni-0a1b2c3d 10.0.1.201 198.51.100.2 49153 {} {} 25 20000 1620140761 1620140821 ACCEPT OK",
        dstport, protocol
    )
}
