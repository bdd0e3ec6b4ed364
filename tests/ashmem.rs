// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use ashmem::get_size;
use ashmem::read_name;
use ashmem::Descriptor;

// A failed query must surface on the error channel; a fabricated zero size or
// empty name would be indistinguishable from a real empty region.

#[test]
fn get_size_fails_on_never_opened_handle() {
    let err = get_size(&Descriptor(-1)).unwrap_err();
    assert_eq!(err.errno(), libc::EBADF);
}

#[test]
fn read_name_fails_on_never_opened_handle() {
    let mut buf = [0u8; 16];
    let err = read_name(&Descriptor(-1), &mut buf).unwrap_err();
    assert_eq!(err.errno(), libc::EBADF);
    assert_eq!(buf, [0u8; 16]);
}

#[test]
fn queries_fail_on_non_ashmem_descriptor() {
    let file = tempfile::tempfile().unwrap();
    let err = get_size(&file).unwrap_err();
    assert_eq!(err.errno(), libc::ENOTTY);

    let mut buf = [0u8; 16];
    let err = read_name(&file, &mut buf).unwrap_err();
    assert_eq!(err.errno(), libc::ENOTTY);
}

#[cfg(target_os = "android")]
mod device {
    use ashmem::AshmemRegion;
    use ashmem::SafeDescriptor;
    use ashmem::ASHMEM_NAME_LEN;

    #[test]
    fn create_and_query() {
        let region = AshmemRegion::new("region-a", 4096).unwrap();
        assert_eq!(region.size().unwrap(), 4096);

        let mut buf = [0u8; 16];
        assert_eq!(region.read_name(&mut buf).unwrap(), 8);
        assert_eq!(&buf[..8], b"region-a");
        assert_eq!(region.name().unwrap(), "region-a");
    }

    #[test]
    fn queries_are_idempotent() {
        let region = AshmemRegion::new("steady", 8192).unwrap();
        assert_eq!(region.size().unwrap(), region.size().unwrap());
        assert_eq!(region.name().unwrap(), region.name().unwrap());
    }

    #[test]
    fn read_name_truncates_to_buffer() {
        let region = AshmemRegion::new("region-a", 4096).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(region.read_name(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"regi");
    }

    #[test]
    fn overlong_name_stays_within_capacity() {
        let name = "x".repeat(ASHMEM_NAME_LEN + 16);
        let region = AshmemRegion::new(name, 1024).unwrap();
        assert!(region.name().unwrap().len() < ASHMEM_NAME_LEN);
    }

    #[test]
    fn adopted_descriptor_reports_same_metadata() {
        let region = AshmemRegion::new("shared", 2048).unwrap();
        let descriptor = SafeDescriptor::from(region);
        let adopted = AshmemRegion::from_safe_descriptor(descriptor.try_clone().unwrap());
        assert_eq!(adopted.size().unwrap(), 2048);
        assert_eq!(adopted.name().unwrap(), "shared");
    }
}
