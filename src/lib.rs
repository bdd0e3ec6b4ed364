// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Userspace interface to the Android anonymous shared memory driver.
//!
//! An ashmem region is created by opening `/dev/ashmem` and configuring the
//! fresh descriptor's name and size through ioctls. [`AshmemRegion`] wraps
//! that sequence and the metadata queries; mapping the descriptor and managing
//! the region's contents are left to the caller.

mod descriptor;
mod errno;
pub mod ioctl;
mod region;
pub mod uapi;

pub use descriptor::AsRawDescriptor;
pub use descriptor::Descriptor;
pub use descriptor::FromRawDescriptor;
pub use descriptor::IntoRawDescriptor;
pub use descriptor::RawDescriptor;
pub use descriptor::SafeDescriptor;
pub use descriptor::INVALID_DESCRIPTOR;
pub use errno::errno_result;
pub use errno::Error;
pub use errno::Result;
pub use ioctl::ioctl;
pub use ioctl::ioctl_with_mut_ref;
pub use ioctl::ioctl_with_ref;
pub use ioctl::ioctl_with_val;
pub use ioctl::IoctlNr;
pub use region::get_size;
pub use region::read_name;
pub use region::AshmemRegion;
pub use region::Error as AshmemError;
pub use region::Result as AshmemResult;
pub use uapi::ASHMEM_DEVICE;
pub use uapi::ASHMEM_NAME_LEN;
