//! Alignment of device recordings against human-recorded session windows
//!
//! The device clock and the scheduler's wall clock disagree, so each
//! recording is trimmed or zero-padded until its first and last samples
//! correspond to the humanly recorded interval. A session that was recorded
//! as two physical files is stitched back into one logical series with the
//! gap between the parts removed.

use crate::clock::ClockTime;
use crate::recording::DeviceRecording;
use crate::stats::StatBlock;

/// The human-recorded session window, all fields optional.
///
/// `start2`/`end2` carry the second window of a split-session recording.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlignmentWindow {
    pub start: Option<ClockTime>,
    pub end: Option<ClockTime>,
    pub start2: Option<ClockTime>,
    pub end2: Option<ClockTime>,
}

/// One recording aligned to its session window, plus schedule metadata and
/// the statistics computed from the raw samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub samples: Vec<f64>,
    pub sample_indices: Vec<i64>,
    pub sampling_rate_hz: i64,
    pub start: Option<ClockTime>,
    pub end: Option<ClockTime>,
    pub duration: Option<ClockTime>,
    pub gender: String,
    pub note: String,
    pub stats: Option<StatBlock>,
}

/// Align a recording to the human-recorded window.
///
/// With no recorded start time the samples pass through verbatim and every
/// time field of the output is absent; a missing time is data, not an error.
pub fn align(
    recording: &DeviceRecording,
    window: &AlignmentWindow,
    gender: String,
    note: String,
    stats: Option<StatBlock>,
) -> AlignedSeries {
    let rate = recording.sampling_rate_hz;
    let device_start = recording.start_time;
    let original_len = recording.samples.len() as i64;

    let Some(start) = window.start else {
        return AlignedSeries {
            samples: recording.samples.clone(),
            sample_indices: recording.sample_indices.clone(),
            sampling_rate_hz: rate,
            start: None,
            end: None,
            duration: None,
            gender,
            note,
            stats,
        };
    };

    // Start alignment: after this block the series origin is `start`.
    let mut samples = if device_start > start {
        // device began recording after the window opened
        let missing = ((device_start - start) * rate) as usize;
        let mut padded = vec![0.0; missing];
        padded.extend_from_slice(&recording.samples);
        padded
    } else {
        // device was already recording when the window opened
        let cutoff = ((start - device_start) * rate) as usize;
        recording.samples.get(cutoff..).unwrap_or(&[]).to_vec()
    };

    // Device's implied end position on the absolute sample axis.
    let device_end_sample = device_start * rate + original_len;

    if let (Some(end), Some(start2), Some(end2)) = (window.end, window.start2, window.end2) {
        // Split session: keep part 1, drop the gap, append the end-aligned
        // second part.
        let part1_len = ((end - start) * rate).max(0) as usize;
        let part2_from = ((start2 - start) * rate).max(0) as usize;
        let mut part2 = samples.get(part2_from..).unwrap_or(&[]).to_vec();
        samples.truncate(part1_len);

        let end2_sample = end2 * rate;
        if end2_sample > device_end_sample {
            part2.extend(std::iter::repeat(0.0).take((end2_sample - device_end_sample) as usize));
        }
        samples.extend(part2);

        return finish(samples, rate, Some(start), Some(end2), Some(end2 - start), gender, note, stats);
    }

    if let Some(end) = window.end {
        let end_sample = end * rate;
        let start_sample = start * rate;
        if end_sample > device_end_sample {
            // window outlasts the recording
            samples.extend(std::iter::repeat(0.0).take((end_sample - device_end_sample) as usize));
        } else {
            samples.truncate((end_sample - start_sample).max(0) as usize);
        }
        return finish(samples, rate, Some(start), Some(end), Some(end - start), gender, note, stats);
    }

    finish(samples, rate, Some(start), None, None, gender, note, stats)
}

#[allow(clippy::too_many_arguments)]
fn finish(
    samples: Vec<f64>,
    rate: i64,
    start: Option<ClockTime>,
    end: Option<ClockTime>,
    duration: Option<ClockTime>,
    gender: String,
    note: String,
    stats: Option<StatBlock>,
) -> AlignedSeries {
    let sample_indices = (0..samples.len() as i64).collect();
    AlignedSeries {
        samples,
        sample_indices,
        sampling_rate_hz: rate,
        start,
        end,
        duration,
        gender,
        note,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::format_hms;
    use pretty_assertions::assert_eq;

    fn recording(samples: Vec<f64>, rate: i64, start_time: i64) -> DeviceRecording {
        let sample_indices = (0..samples.len() as i64).collect();
        DeviceRecording {
            samples,
            sample_indices,
            sampling_rate_hz: rate,
            start_time,
        }
    }

    fn window(start: Option<i64>, end: Option<i64>) -> AlignmentWindow {
        AlignmentWindow {
            start,
            end,
            ..Default::default()
        }
    }

    #[test]
    fn exact_fit_needs_no_trim_or_pad() {
        let rec = recording(vec![0.5; 240], 4, 3600);
        let aligned = align(&rec, &window(Some(3600), Some(3660)), String::new(), String::new(), None);
        assert_eq!(aligned.samples.len(), 240);
        assert_eq!(format_hms(aligned.start.unwrap()), "01:00:00");
        assert_eq!(aligned.duration, Some(60));
    }

    #[test]
    fn front_trim_then_end_trim() {
        let rec = recording(vec![1.0; 200], 1, 3600);
        let aligned = align(&rec, &window(Some(3700), Some(3760)), String::new(), String::new(), None);
        // 100 samples trimmed from the front, then cut to the 60-second window
        assert_eq!(aligned.samples.len(), 60);
        assert!(aligned.samples.iter().all(|&v| v == 1.0));
        assert_eq!(aligned.sample_indices, (0..60).collect::<Vec<i64>>());
    }

    #[test]
    fn late_device_start_prepends_zeros() {
        let rec = recording(vec![1.0; 100], 1, 3700);
        let aligned = align(&rec, &window(Some(3600), Some(3790)), String::new(), String::new(), None);
        // 100 zeros prepended, then truncated to the 190-second window
        assert_eq!(aligned.samples.len(), 190);
        assert!(aligned.samples[..100].iter().all(|&v| v == 0.0));
        assert!(aligned.samples[100..].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn window_outlasting_recording_pads_zeros() {
        let rec = recording(vec![1.0; 50], 1, 3600);
        let aligned = align(&rec, &window(Some(3600), Some(3700)), String::new(), String::new(), None);
        // device stops at sample 3650, window runs to 3700
        assert_eq!(aligned.samples.len(), 100);
        assert!(aligned.samples[50..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn absent_start_passes_through() {
        let rec = recording(vec![0.1, 0.2, 0.3], 4, 3600);
        let aligned = align(&rec, &window(None, Some(3660)), "F".into(), "note".into(), None);
        assert_eq!(aligned.samples, vec![0.1, 0.2, 0.3]);
        assert_eq!(aligned.start, None);
        assert_eq!(aligned.end, None);
        assert_eq!(aligned.duration, None);
        assert_eq!(aligned.gender, "F");
    }

    #[test]
    fn split_session_drops_the_gap() {
        // device records 3600..3800 at 1 Hz; part 1 is 3600..3660,
        // part 2 resumes 3700 and is scheduled to run to 3820
        let samples: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let rec = recording(samples, 1, 3600);
        let w = AlignmentWindow {
            start: Some(3600),
            end: Some(3660),
            start2: Some(3700),
            end2: Some(3820),
        };
        let aligned = align(&rec, &w, String::new(), String::new(), None);
        // part 1: 60 samples, part 2: samples from offset 100 on (100 of
        // them) plus 20 zeros of padding to reach 3820
        assert_eq!(aligned.samples.len(), 180);
        assert_eq!(aligned.samples[59], 59.0);
        assert_eq!(aligned.samples[60], 100.0);
        assert!(aligned.samples[160..].iter().all(|&v| v == 0.0));
        assert_eq!(aligned.end, Some(3820));
        assert_eq!(aligned.duration, Some(220));
    }

    #[test]
    fn duration_absent_without_end() {
        let rec = recording(vec![1.0; 10], 1, 3600);
        let aligned = align(&rec, &window(Some(3600), None), String::new(), String::new(), None);
        assert_eq!(aligned.samples.len(), 10);
        assert_eq!(aligned.end, None);
        assert_eq!(aligned.duration, None);
    }
}
