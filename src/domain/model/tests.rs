// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::model::*;

    #[test]
    fn test_clip_id_round_trips_through_display() {
        let id = ClipId::new();
        let parsed: ClipId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<ClipId>().is_err());
    }

    #[test]
    fn test_clip_data_omits_missing_title() {
        let data = ClipData {
            title: None,
            start_time: "00:00:10".to_string(),
            end_time: "00:00:20".to_string(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"start_time": "00:00:10", "end_time": "00:00:20"})
        );
    }

    #[test]
    fn test_quality_parse_and_labels() {
        assert_eq!(Quality::parse("1080p").unwrap(), Quality::P1080);
        assert_eq!(Quality::parse("4k").unwrap(), Quality::P4K);
        assert_eq!(Quality::parse("2160p").unwrap(), Quality::P4K);
        assert!(Quality::parse("480p").is_err());
        assert_eq!(Quality::P1440.to_string(), "1440p");
    }

    #[test]
    fn test_quality_matches_resolution() {
        assert!(Quality::P1080.matches_resolution("1920x1080"));
        assert!(!Quality::P1080.matches_resolution("1280x720"));
        assert!(Quality::P4K.matches_resolution("3840x2160"));
        assert!(Quality::P4K.matches_resolution("4K"));
    }

    #[test]
    fn test_format_descriptor_accepts_text_fps() {
        let json = r#"{
            "format_id": "137",
            "quality_label": "1920x1080",
            "resolution": "1920x1080",
            "fps": "Unknown",
            "ext": "mp4",
            "filesize_mb": null,
            "note": "(audio will be merged automatically)"
        }"#;
        let format: FormatDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(format.fps, FrameRate::Text("Unknown".to_string()));
        assert_eq!(format.filesize_mb, None);

        let json = r#"{"format_id": "22", "resolution": "1280x720", "fps": 30}"#;
        let format: FormatDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(format.fps, FrameRate::Fps(30.0));
    }

    #[test]
    fn test_phase_from_status_vocabularies() {
        assert_eq!(JobPhase::from_status("downloading"), Some(JobPhase::Downloading));
        assert_eq!(JobPhase::from_status("processing"), Some(JobPhase::Processing));
        assert_eq!(JobPhase::from_status("completed"), Some(JobPhase::Completed));
        assert_eq!(JobPhase::from_status("ERROR"), Some(JobPhase::Error));
        assert_eq!(JobPhase::from_status("started"), None);
    }

    #[test]
    fn test_phase_transitions_are_forward_only() {
        assert!(JobPhase::Idle.can_transition_to(JobPhase::Submitting));
        assert!(JobPhase::Submitting.can_transition_to(JobPhase::Downloading));
        assert!(JobPhase::Submitting.can_transition_to(JobPhase::Processing));
        assert!(JobPhase::Downloading.can_transition_to(JobPhase::Processing));
        assert!(!JobPhase::Processing.can_transition_to(JobPhase::Downloading));
        assert!(JobPhase::Processing.can_transition_to(JobPhase::Error));
        assert!(!JobPhase::Idle.can_transition_to(JobPhase::Error));
    }

    #[test]
    fn test_terminal_phases_cannot_be_left() {
        for next in [
            JobPhase::Idle,
            JobPhase::Submitting,
            JobPhase::Downloading,
            JobPhase::Processing,
            JobPhase::Completed,
            JobPhase::Error,
        ] {
            assert!(!JobPhase::Completed.can_transition_to(next));
            assert!(!JobPhase::Error.can_transition_to(next));
        }
    }

    #[test]
    fn test_job_status_response_tolerates_missing_fields() {
        let json = r#"{"status": "downloading", "current_step": "Starting download..."}"#;
        let response: JobStatusResponse = serde_json::from_str(json).unwrap();
        let (snapshot, phase) = JobSnapshot::from_job_status("abc", response);
        assert_eq!(phase, Some(JobPhase::Downloading));
        assert_eq!(snapshot.total_clips, 0);
        assert!(snapshot.progress_derived);
        assert_eq!(snapshot.current_step, "Starting download...");
    }

    #[test]
    fn test_video_status_maps_to_snapshot() {
        let response = VideoStatusResponse {
            status: "completed".to_string(),
            current_step: Some("Download completed!".to_string()),
            title: Some("Some talk".to_string()),
            file_path: Some("downloads/v1_Some talk.mp4".to_string()),
            file_size: 2048,
            error: None,
        };
        let (snapshot, phase) = JobSnapshot::from_video_status("v1", response);
        assert_eq!(phase, Some(JobPhase::Completed));
        assert_eq!(snapshot.kind, JobKind::VideoDownload);
        assert_eq!(snapshot.video_id.as_deref(), Some("v1"));
        assert_eq!(snapshot.file_size, 2048);
    }

    #[test]
    fn test_job_request_accessors() {
        let download = JobRequest::Download {
            youtube_url: "https://youtu.be/x".to_string(),
            format_id: None,
        };
        assert_eq!(download.youtube_url(), Some("https://youtu.be/x"));
        assert!(download.clips().is_empty());

        let from_video = JobRequest::FromVideo {
            video_id: None,
            clips: vec![],
        };
        assert_eq!(from_video.youtube_url(), None);
    }
}
