// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::CString;
use std::os::unix::io::AsRawFd;
use std::os::unix::io::RawFd;

use libc::c_char;
use libc::c_ulong;
use libc::O_CLOEXEC;
use libc::O_RDWR;
use remain::sorted;

use crate::descriptor::AsRawDescriptor;
use crate::descriptor::FromRawDescriptor;
use crate::descriptor::IntoRawDescriptor;
use crate::descriptor::RawDescriptor;
use crate::descriptor::SafeDescriptor;
use crate::errno;
use crate::errno::errno_result;
use crate::ioctl::ioctl;
use crate::ioctl::ioctl_with_mut_ref;
use crate::ioctl::ioctl_with_ref;
use crate::ioctl::ioctl_with_val;
use crate::uapi::ASHMEM_DEVICE;
use crate::uapi::ASHMEM_GET_NAME;
use crate::uapi::ASHMEM_GET_SIZE;
use crate::uapi::ASHMEM_NAME_LEN;
use crate::uapi::ASHMEM_SET_NAME;
use crate::uapi::ASHMEM_SET_SIZE;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from creating an ashmem region or querying its metadata. Syscall
/// variants carry the errno reported by the driver.
#[sorted]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("region name contains a NUL byte")]
    InvalidName,
    #[error("stored region name is not valid UTF-8")]
    NameNotUtf8,
    #[error("failed to open ashmem device: {0}")]
    OpenDevice(#[source] crate::Error),
    #[error("failed to read region name: {0}")]
    QueryName(#[source] crate::Error),
    #[error("failed to read region size: {0}")]
    QuerySize(#[source] crate::Error),
    #[error("failed to set region name: {0}")]
    SetName(#[source] crate::Error),
    #[error("failed to set region size: {0}")]
    SetSize(#[source] crate::Error),
}

/// A kernel-backed anonymous shared memory region.
///
/// Dropping an `AshmemRegion` closes the underlying descriptor. To keep the
/// region alive past the wrapper, move the descriptor out with
/// `into_raw_descriptor` or `SafeDescriptor::from`; mapping the descriptor and
/// managing the region's contents are the caller's responsibility.
#[derive(Debug)]
pub struct AshmemRegion {
    descriptor: SafeDescriptor,
}

impl AshmemRegion {
    /// Creates a region of `size` bytes named `debug_name`.
    ///
    /// `debug_name` identifies the region for debugging purposes, for example
    /// in `/proc/<pid>/maps` once the descriptor is mapped. It does not need to
    /// be unique and is truncated to `ASHMEM_NAME_LEN - 1` bytes.
    pub fn new<T: Into<Vec<u8>>>(debug_name: T, size: usize) -> Result<AshmemRegion> {
        let debug_name = CString::new(debug_name).map_err(|_| Error::InvalidName)?;

        // Safe because we give a constant nul-terminated path and verify the result.
        let ret =
            unsafe { libc::open(ASHMEM_DEVICE.as_ptr() as *const c_char, O_RDWR | O_CLOEXEC) };
        if ret < 0 {
            return Err(Error::OpenDevice(crate::Error::last()));
        }
        // Safe because we verify that ret is valid and we own the descriptor. Every
        // early return below closes the half-configured descriptor.
        let descriptor = unsafe { SafeDescriptor::from_raw_descriptor(ret) };

        let name = name_field(debug_name.as_bytes());
        // Safe because the driver reads at most ASHMEM_NAME_LEN bytes from the
        // field, which outlives the call, and we check the return value.
        let ret = unsafe { ioctl_with_ref(&descriptor, ASHMEM_SET_NAME(), &name) };
        if ret < 0 {
            return Err(Error::SetName(crate::Error::last()));
        }

        // Safe because the driver takes the size by value and we check the return
        // value.
        let ret = unsafe { ioctl_with_val(&descriptor, ASHMEM_SET_SIZE(), size as c_ulong) };
        if ret < 0 {
            return Err(Error::SetSize(crate::Error::last()));
        }

        Ok(AshmemRegion { descriptor })
    }

    /// Wraps a region descriptor received from elsewhere, typically another
    /// process. The region's recorded metadata can be read back with
    /// [`AshmemRegion::name`] and [`AshmemRegion::size`].
    pub fn from_safe_descriptor(descriptor: SafeDescriptor) -> AshmemRegion {
        AshmemRegion { descriptor }
    }

    /// Returns the region's size in bytes as recorded by the driver.
    pub fn size(&self) -> Result<usize> {
        get_size(&self.descriptor).map_err(Error::QuerySize)
    }

    /// Copies the region's stored name into `buf` and returns the number of
    /// bytes written: the smaller of the stored name's length and `buf.len()`.
    ///
    /// A count equal to `buf.len()` may mean the name was truncated, and the
    /// copied bytes are not nul-terminated in that case.
    pub fn read_name(&self, buf: &mut [u8]) -> Result<usize> {
        read_name(&self.descriptor, buf).map_err(Error::QueryName)
    }

    /// Returns the region's stored name.
    pub fn name(&self) -> Result<String> {
        let mut buf = [0u8; ASHMEM_NAME_LEN];
        let len = self.read_name(&mut buf)?;
        String::from_utf8(buf[..len].to_vec()).map_err(|_| Error::NameNotUtf8)
    }
}

impl AsRawDescriptor for AshmemRegion {
    fn as_raw_descriptor(&self) -> RawDescriptor {
        self.descriptor.as_raw_descriptor()
    }
}

impl IntoRawDescriptor for AshmemRegion {
    fn into_raw_descriptor(self) -> RawDescriptor {
        self.descriptor.into_raw_descriptor()
    }
}

impl From<AshmemRegion> for SafeDescriptor {
    fn from(region: AshmemRegion) -> SafeDescriptor {
        region.descriptor
    }
}

impl AsRawFd for AshmemRegion {
    fn as_raw_fd(&self) -> RawFd {
        self.as_raw_descriptor()
    }
}

/// Queries the driver for the size of the region behind `descriptor`.
///
/// The driver reports the size in the ioctl return value, a C `int`, so a
/// region larger than `i32::MAX` bytes cannot be read back faithfully.
pub fn get_size(descriptor: &dyn AsRawDescriptor) -> errno::Result<usize> {
    // Safe because this request takes no argument and we check the return value.
    let ret = unsafe { ioctl(descriptor, ASHMEM_GET_SIZE()) };
    if ret < 0 {
        return errno_result();
    }
    Ok(ret as usize)
}

/// Queries the driver for the name of the region behind `descriptor` and
/// copies it into `buf`, truncating to `buf.len()` bytes. Returns the number
/// of bytes copied.
pub fn read_name(descriptor: &dyn AsRawDescriptor, buf: &mut [u8]) -> errno::Result<usize> {
    let mut field = [0u8; ASHMEM_NAME_LEN];
    // Safe because the driver writes at most ASHMEM_NAME_LEN bytes into the
    // field and we check the return value.
    let ret = unsafe { ioctl_with_mut_ref(descriptor, ASHMEM_GET_NAME(), &mut field) };
    if ret < 0 {
        return errno_result();
    }
    Ok(copy_name(&field, buf))
}

/// Builds the fixed-size argument for `ASHMEM_SET_NAME`, truncating `name`
/// against the field capacity while keeping the terminator.
fn name_field(name: &[u8]) -> [u8; ASHMEM_NAME_LEN] {
    let mut field = [0u8; ASHMEM_NAME_LEN];
    let len = name.len().min(ASHMEM_NAME_LEN - 1);
    field[..len].copy_from_slice(&name[..len]);
    field
}

/// Copies the nul-terminated name out of `field` into `buf`, truncating to
/// `buf.len()` bytes.
fn copy_name(field: &[u8; ASHMEM_NAME_LEN], buf: &mut [u8]) -> usize {
    let len = field.iter().position(|&b| b == 0).unwrap_or(ASHMEM_NAME_LEN);
    let len = len.min(buf.len());
    buf[..len].copy_from_slice(&field[..len]);
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_field_round_trips() {
        let field = name_field(b"region-a");
        let mut buf = [0u8; 16];
        assert_eq!(copy_name(&field, &mut buf), 8);
        assert_eq!(&buf[..8], b"region-a");
    }

    #[test]
    fn name_field_bounds_overlong_names() {
        let long = [b'a'; ASHMEM_NAME_LEN + 64];
        let field = name_field(&long);
        assert_eq!(field[ASHMEM_NAME_LEN - 1], 0);
        let mut buf = [0u8; ASHMEM_NAME_LEN];
        assert_eq!(copy_name(&field, &mut buf), ASHMEM_NAME_LEN - 1);
    }

    #[test]
    fn copy_name_truncates_to_destination() {
        let field = name_field(b"region-a");
        let mut buf = [0u8; 4];
        assert_eq!(copy_name(&field, &mut buf), 4);
        assert_eq!(&buf, b"regi");
    }

    #[test]
    fn copy_name_with_empty_field() {
        let field = name_field(b"");
        let mut buf = [0u8; 4];
        assert_eq!(copy_name(&field, &mut buf), 0);
        assert_eq!(&buf, &[0u8; 4]);
    }

    #[test]
    fn nul_in_name_rejected_before_open() {
        match AshmemRegion::new("bad\0name", 16) {
            Err(Error::InvalidName) => {}
            other => panic!("expected InvalidName, got {:?}", other),
        }
    }
}
