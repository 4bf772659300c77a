// Unit tests for business rules

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::domain::rules::*;

    fn format(id: &str, resolution: &str) -> FormatDescriptor {
        FormatDescriptor {
            format_id: id.to_string(),
            quality_label: resolution.to_string(),
            resolution: resolution.to_string(),
            fps: FrameRate::Fps(30.0),
            ext: "mp4".to_string(),
            filesize_mb: Some(12.5),
            note: String::new(),
        }
    }

    fn clip(start: &str, end: &str) -> ClipData {
        ClipData {
            title: None,
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    #[test]
    fn test_quality_available_iff_token_present() {
        let formats = vec![format("137", "1920x1080"), format("22", "1280x720")];
        assert!(QualitySelector::is_quality_available(Quality::P1080, &formats));
        assert!(QualitySelector::is_quality_available(Quality::P720, &formats));
        assert!(!QualitySelector::is_quality_available(Quality::P1440, &formats));
        assert!(!QualitySelector::is_quality_available(Quality::P1080, &[]));
    }

    #[test]
    fn test_best_quality_walks_preference_order() {
        let formats = vec![format("313", "3840x2160"), format("22", "1280x720")];
        let preference = [Quality::P1080, Quality::P1440, Quality::P720, Quality::P4K];
        assert_eq!(
            QualitySelector::best_available_quality(&formats, &preference),
            Some(Quality::P720)
        );
    }

    #[test]
    fn test_best_quality_none_when_nothing_matches() {
        let formats = vec![format("18", "640x360")];
        assert_eq!(
            QualitySelector::best_available_quality(&formats, &Quality::DEFAULT_PREFERENCE),
            None
        );
    }

    #[test]
    fn test_four_k_matches_explicit_token() {
        let formats = vec![format("401", "4K")];
        assert!(QualitySelector::is_quality_available(Quality::P4K, &formats));
    }

    #[test]
    fn test_reconcile_keeps_or_reassigns() {
        let formats = vec![format("137", "1920x1080"), format("22", "1280x720")];
        let pref = Quality::DEFAULT_PREFERENCE;
        assert_eq!(
            QualitySelector::reconcile(Some(Quality::P720), &formats, &pref),
            Some(Quality::P720)
        );
        assert_eq!(
            QualitySelector::reconcile(Some(Quality::P4K), &formats, &pref),
            Some(Quality::P1080)
        );
        assert_eq!(QualitySelector::reconcile(Some(Quality::P4K), &[], &pref), None);
    }

    #[test]
    fn test_format_for_quality_picks_first_match() {
        let formats = vec![
            format("299", "1920x1080"),
            format("137", "1920x1080"),
            format("22", "1280x720"),
        ];
        let chosen = QualitySelector::format_for_quality(Quality::P1080, &formats).unwrap();
        assert_eq!(chosen.format_id, "299");
        assert_eq!(
            QualitySelector::available_qualities(&formats),
            vec![Quality::P720, Quality::P1080]
        );
    }

    #[test]
    fn test_url_validation() {
        assert!(SubmissionValidator::is_valid_url("https://www.youtube.com/watch?v=abc"));
        assert!(SubmissionValidator::is_valid_url("youtu.be/abc"));
        assert!(!SubmissionValidator::is_valid_url("https://vimeo.com/123"));
        assert!(!SubmissionValidator::is_valid_url("https://youtube.com/"));

        let err = SubmissionValidator::validate_url("   ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_clip_validation() {
        assert!(SubmissionValidator::validate_clips(&[clip("00:00:10", "00:00:20")]).is_ok());
        assert!(SubmissionValidator::validate_clips(&[]).is_err());
        assert!(SubmissionValidator::validate_clips(&[clip("0:10", "00:00:20")]).is_err());
        assert!(SubmissionValidator::validate_clips(&[clip("00:00:20", "00:00:20")]).is_err());
    }

    #[test]
    fn test_request_validation_runs_before_network() {
        let request = JobRequest::Unified {
            youtube_url: "https://www.youtube.com/watch?v=abc".to_string(),
            clips: vec![clip("00:01:00", "bad")],
            format_id: None,
        };
        let err = SubmissionValidator::validate_request(&request).unwrap_err();
        assert!(err.to_string().contains("HH:MM:SS"));

        let download = JobRequest::Download {
            youtube_url: "not a url".to_string(),
            format_id: None,
        };
        assert!(SubmissionValidator::validate_request(&download).is_err());
    }

    #[test]
    fn test_progress_estimate() {
        assert_eq!(ProgressEstimator::estimate(JobPhase::Downloading, 0, 2), 10.0);
        assert_eq!(ProgressEstimator::estimate(JobPhase::Processing, 1, 2), 50.0);
        assert_eq!(ProgressEstimator::estimate(JobPhase::Processing, 0, 0), 0.0);
        assert_eq!(ProgressEstimator::estimate(JobPhase::Completed, 0, 0), 100.0);
    }
}
