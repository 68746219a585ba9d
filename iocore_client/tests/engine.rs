use image::{ImageBuffer, Rgba};
use iocore::boundary::{FreeString, ProcessImage};
use iocore_client::{ClientError, Exports, IoCore};

fn linked_engine() -> IoCore {
    // SAFETY: the engine is linked into this test binary with the exported signatures.
    unsafe {
        IoCore::from_exports(Exports {
            process: ProcessImage,
            free: FreeString,
        })
    }
}

#[test]
fn processes_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.png");
    let output = dir.path().join("out.png");
    ImageBuffer::from_pixel(10, 10, Rgba([10u8, 20, 30, 255]))
        .save(&input)
        .unwrap();

    linked_engine().process_image(&input, &output).unwrap();

    assert!(output.exists());
}

#[test]
fn missing_input_surfaces_engine_message() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.png");
    let output = dir.path().join("out.png");

    let err = linked_engine().process_image(&input, &output).unwrap_err();

    match err {
        ClientError::Engine(message) => assert!(message.contains("missing.png"), "{message}"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn empty_input_is_an_engine_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = linked_engine()
        .process_image("".as_ref(), &dir.path().join("out.png"))
        .unwrap_err();
    assert!(matches!(err, ClientError::Engine(ref m) if m == "Source path is empty"));
}

#[test]
fn interior_nul_never_reaches_the_engine() {
    let err = linked_engine()
        .process_image("in\0put.png".as_ref(), "out.png".as_ref())
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidPath { reason: "contains a NUL byte", .. }));
}
