//! Upload coordinator against the in-process fake API.

use crate::fake_api::{Call, FakeUploadApi};
use bytes::Bytes;
use merlin::files::ExpiresAfter;
use merlin::uploads::{CreateUploadRequest, MAX_PART_SIZE};
use merlin::{ByteSource, Error, MerlinClient, MultipartUpload, UploadStatus, Uploads};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const MIB: usize = 1024 * 1024;

fn uploads(api: &Arc<FakeUploadApi>) -> Uploads {
    MerlinClient::with_transport(api.clone()).uploads()
}

/// `sizes[i]` bytes, all equal to `i`, so every part can be traced back to its offset.
fn striped(sizes: &[usize]) -> Bytes {
    let mut data = Vec::with_capacity(sizes.iter().sum());
    for (i, size) in sizes.iter().enumerate() {
        data.resize(data.len() + size, i as u8);
    }
    Bytes::from(data)
}

#[tokio::test]
async fn large_source_is_split_into_64_mib_parts() {
    let api = Arc::new(FakeUploadApi::new());
    let source = ByteSource::from_bytes(striped(&[64 * MIB, 64 * MIB, 22 * MIB])).with_name("dataset.jsonl");

    let file = uploads(&api)
        .multipart_upload(source, MultipartUpload::new("fine-tune", "text/jsonl"))
        .await
        .unwrap();

    assert_eq!(file.id, "file-abc");
    assert_eq!(file.bytes, 150 * MIB as u64);
    assert_eq!(file.filename, "dataset.jsonl");
    assert_eq!(
        api.part_calls(),
        vec![(64 * MIB, Some(0)), (64 * MIB, Some(1)), (22 * MIB, Some(2))]
    );
    assert_eq!(
        api.completed_part_ids().unwrap(),
        vec!["part_0", "part_1", "part_2"]
    );

    let calls = api.calls();
    match &calls[0] {
        Call::CreateUpload(body) => {
            assert_eq!(body["bytes"], 150 * MIB as u64);
            assert_eq!(body["mime_type"], "text/jsonl");
            assert_eq!(body["purpose"], "fine-tune");
            assert!(body.get("expires_after").is_none());
        }
        other => panic!("expected create first, got {:?}", other),
    }
    assert!(matches!(calls.last(), Some(Call::Complete { .. })));
}

#[tokio::test]
async fn part_ids_follow_byte_order_not_completion_order() {
    let api = Arc::new(FakeUploadApi::new().slow_first_parts());
    let source = ByteSource::from_bytes(striped(&[4, 4, 4, 2]));

    uploads(&api)
        .multipart_upload(
            source,
            MultipartUpload::new("assistants", "application/octet-stream")
                .part_size(4)
                .concurrency(4),
        )
        .await
        .unwrap();

    // The fake answers later parts first.
    let finished: Vec<Option<u8>> = api.part_calls().into_iter().map(|(_, b)| b).collect();
    assert_eq!(finished, vec![Some(3), Some(2), Some(1), Some(0)]);
    assert_eq!(
        api.completed_part_ids().unwrap(),
        vec!["part_0", "part_1", "part_2", "part_3"]
    );
}

#[tokio::test]
async fn every_part_stays_within_the_limit() {
    let api = Arc::new(FakeUploadApi::new());
    let source = ByteSource::from_bytes(striped(&[10, 10, 3]));

    uploads(&api)
        .multipart_upload(source, MultipartUpload::new("batch", "text/plain").part_size(10))
        .await
        .unwrap();

    let lens: Vec<usize> = api.part_calls().into_iter().map(|(len, _)| len).collect();
    assert_eq!(lens, vec![10, 10, 3]);
    assert_eq!(lens.iter().sum::<usize>(), 23);
}

#[tokio::test]
async fn oversized_part_size_is_clamped() {
    let api = Arc::new(FakeUploadApi::new());
    let source = ByteSource::from_bytes(vec![0u8; 16]);

    uploads(&api)
        .multipart_upload(
            source,
            MultipartUpload::new("batch", "text/plain").part_size(MAX_PART_SIZE * 4),
        )
        .await
        .unwrap();

    assert_eq!(api.part_calls(), vec![(16, Some(0))]);
}

#[tokio::test]
async fn zero_part_size_is_rejected_before_any_request() {
    let api = Arc::new(FakeUploadApi::new());
    let err = uploads(&api)
        .multipart_upload(
            ByteSource::from_bytes(vec![1u8; 4]),
            MultipartUpload::new("batch", "text/plain").part_size(0),
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn empty_source_completes_with_no_parts() {
    let api = Arc::new(FakeUploadApi::new());
    let file = uploads(&api)
        .multipart_upload(ByteSource::from_bytes(Bytes::new()), MultipartUpload::new("batch", "text/plain"))
        .await
        .unwrap();

    assert_eq!(file.bytes, 0);
    assert_eq!(file.filename, "upload.bin");
    assert!(api.part_calls().is_empty());
    assert_eq!(api.completed_part_ids().unwrap(), Vec::<String>::new());
}

#[tokio::test]
async fn failed_part_aborts_without_completing_or_cancelling() {
    let api = Arc::new(FakeUploadApi::new().failing_part(2));
    let err = uploads(&api)
        .multipart_upload(
            ByteSource::from_bytes(striped(&[4, 4, 4])),
            MultipartUpload::new("batch", "text/plain").part_size(4),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    let calls = api.calls();
    assert!(!calls.iter().any(|c| matches!(c, Call::Complete { .. })));
    assert!(!calls.iter().any(|c| matches!(c, Call::Cancel { .. })));
}

#[tokio::test]
async fn completion_without_file_is_protocol_error() {
    let api = Arc::new(FakeUploadApi::new().completing_without_file());
    let err = uploads(&api)
        .multipart_upload(ByteSource::from_bytes(vec![9u8; 3]), MultipartUpload::new("batch", "text/plain"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol { .. }));
}

#[tokio::test]
async fn completion_with_empty_file_is_protocol_error() {
    let api = Arc::new(FakeUploadApi::new().completing_with_empty_file());
    let err = uploads(&api)
        .multipart_upload(ByteSource::from_bytes(vec![9u8; 3]), MultipartUpload::new("batch", "text/plain"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol { .. }), "got {:?}", err);
    assert!(matches!(api.calls().last(), Some(Call::Complete { .. })));
}

#[tokio::test]
async fn cancellation_between_parts_cancels_remotely() {
    let token = CancellationToken::new();
    let api = Arc::new(FakeUploadApi::new().cancelling_after(1, token.clone()));

    let err = uploads(&api)
        .multipart_upload(
            ByteSource::from_bytes(striped(&[4, 4, 4])),
            MultipartUpload::new("batch", "text/plain")
                .part_size(4)
                .cancellation(token),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert_eq!(api.part_calls().len(), 1);
    let calls = api.calls();
    assert_eq!(
        calls.last(),
        Some(&Call::Cancel {
            upload_id: "upload_abc".into()
        })
    );
    assert!(!calls.iter().any(|c| matches!(c, Call::Complete { .. })));
}

#[tokio::test]
async fn cancelled_token_makes_no_requests() {
    let token = CancellationToken::new();
    token.cancel();
    let api = Arc::new(FakeUploadApi::new());

    let err = uploads(&api)
        .multipart_upload(
            ByteSource::from_bytes(vec![0u8; 8]),
            MultipartUpload::new("batch", "text/plain").cancellation(token),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn options_pass_through_to_create_and_complete() {
    let api = Arc::new(FakeUploadApi::new());
    uploads(&api)
        .multipart_upload(
            ByteSource::from_bytes(vec![0u8; 8]).with_name("ignored.bin"),
            MultipartUpload::new("vision", "image/png")
                .filename("cat.png")
                .expires_after(ExpiresAfter::created_at(3600))
                .md5("d41d8cd98f00b204e9800998ecf8427e"),
        )
        .await
        .unwrap();

    let calls = api.calls();
    let Call::CreateUpload(create) = &calls[0] else {
        panic!("expected create first");
    };
    assert_eq!(create["filename"], "cat.png");
    assert_eq!(create["expires_after"]["seconds"], 3600);
    let Some(Call::Complete { body, .. }) = calls.last() else {
        panic!("expected complete last");
    };
    assert_eq!(body["md5"], "d41d8cd98f00b204e9800998ecf8427e");
}

#[tokio::test]
async fn path_source_names_the_upload() {
    let dir = std::env::temp_dir().join(format!("merlin-upload-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("notes.txt");
    tokio::fs::write(&path, b"some notes").await.unwrap();

    let api = Arc::new(FakeUploadApi::new());
    let file = uploads(&api)
        .multipart_upload(ByteSource::from_path(&path), MultipartUpload::new("assistants", "text/plain"))
        .await
        .unwrap();
    assert_eq!(file.filename, "notes.txt");
    assert_eq!(file.bytes, 10);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn missing_path_fails_before_any_request() {
    let api = Arc::new(FakeUploadApi::new());
    let err = uploads(&api)
        .multipart_upload(
            ByteSource::from_path("/no/such/file.bin"),
            MultipartUpload::new("batch", "text/plain"),
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn low_level_create_then_cancel() {
    let api = Arc::new(FakeUploadApi::new());
    let uploads = uploads(&api);

    let upload = uploads
        .create(&CreateUploadRequest::new(1024, "big.bin", "application/octet-stream", "batch"))
        .await
        .unwrap();
    assert_eq!(upload.status, UploadStatus::Pending);
    assert!(upload.file.is_none());

    let cancelled = uploads.cancel(&upload.id).await.unwrap();
    assert_eq!(cancelled.status, UploadStatus::Cancelled);
    assert!(cancelled.status.is_terminal());
    assert!(cancelled.file.is_none());
}

#[tokio::test]
async fn low_level_complete_uses_caller_order() {
    let api = Arc::new(FakeUploadApi::new());
    let uploads = uploads(&api);
    let upload = uploads
        .create(&CreateUploadRequest::new(2, "x.bin", "application/octet-stream", "batch"))
        .await
        .unwrap();

    let a = uploads.add_part(&upload.id, Bytes::from_static(&[0])).await.unwrap();
    let b = uploads.add_part(&upload.id, Bytes::from_static(&[1])).await.unwrap();
    let done = uploads
        .complete(&upload.id, &[b.id.clone(), a.id.clone()], None)
        .await
        .unwrap();

    assert_eq!(done.status, UploadStatus::Completed);
    assert_eq!(api.completed_part_ids().unwrap(), vec![b.id, a.id]);
}

#[tokio::test]
async fn blank_ids_are_rejected() {
    let api = Arc::new(FakeUploadApi::new());
    let err = uploads(&api).cancel("  ").await.unwrap_err();
    assert!(err.is_validation());
    assert!(api.calls().is_empty());
}
