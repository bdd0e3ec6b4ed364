// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Request numbers and limits of the ashmem driver ABI, per the kernel's
//! `drivers/staging/android/uapi/ashmem.h`.

use libc::c_char;
use libc::c_uint;
use libc::size_t;

use crate::ioctl_io_nr;
use crate::ioctl_ior_nr;
use crate::ioctl_iow_nr;

/// Path of the ashmem device node, with the terminator `libc::open` expects.
pub const ASHMEM_DEVICE: &str = "/dev/ashmem\0";

/// Capacity of the driver's fixed name field, including the terminator.
pub const ASHMEM_NAME_LEN: usize = 256;

/// Ioctl magic shared by all ashmem requests.
pub const ASHMEMIO: c_uint = 0x77;

ioctl_iow_nr!(ASHMEM_SET_NAME, ASHMEMIO, 0x01, [c_char; ASHMEM_NAME_LEN]);
ioctl_ior_nr!(ASHMEM_GET_NAME, ASHMEMIO, 0x02, [c_char; ASHMEM_NAME_LEN]);
ioctl_iow_nr!(ASHMEM_SET_SIZE, ASHMEMIO, 0x03, size_t);
ioctl_io_nr!(ASHMEM_GET_SIZE, ASHMEMIO, 0x04);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_numbers() {
        assert_eq!(0x4100_7701, ASHMEM_SET_NAME() as u32);
        assert_eq!(0x8100_7702, ASHMEM_GET_NAME() as u32);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(0x4008_7703, ASHMEM_SET_SIZE() as u32);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(0x4004_7703, ASHMEM_SET_SIZE() as u32);
        assert_eq!(0x0000_7704, ASHMEM_GET_SIZE() as u32);
    }
}
