// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the host session client and git workspace
//! provisioning.

pub mod host;
pub mod provisioner;
pub mod subprocess;

pub use host::{
    is_busy, CreatedSession, HostAgentInfo, HostClient, HostClientError, HostMessage,
    HostMessagePart, HostSessionStatus, OutgoingPart,
};
pub use provisioner::{cleanup, provision, ProvisionRequest};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use host::{FakeHostClient, HostCall};
