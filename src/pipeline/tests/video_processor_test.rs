use super::fixture::Fixture;
use crate::annotation::store::read_annotation;
use crate::annotation::SensorSnapshot;
use crate::image_classifier::impl_fake::ImageClassifierFake;
use crate::library::logger::impl_fake::LogLevel;
use crate::task_registry::TaskStatus;
use crate::video_decoder::impl_fake::VideoDecoderFake;

const VIDEO: &str = "cam01_20240315142530.mp4";

const SENSORS: &str = "\
Datetime: 2024-03-15 14:25:30.500 - Temp: 21.0 °C - Humidity: 40% - CO2: 600 ppm - PM1: 1 - PM2.5: 2 - PM10: 3
Datetime: 2024-03-15 14:25:31.000 - Temp: 22.0 °C - Humidity: 41% - CO2: 610 ppm - PM1: 4 - PM2.5: 5 - PM10: 6
";

#[test]
fn test_samples_every_nth_frame() {
    let f = Fixture::new(VideoDecoderFake::new(10.0, 25), 10);

    f.video_processor.process(f.request(VIDEO, None));

    assert_eq!(
        f.task_registry.status("task-1"),
        Some(TaskStatus::Completed)
    );
    let annotation = f.task_registry.result("task-1").unwrap();
    assert_eq!(annotation.filename, VIDEO);
    assert_eq!(annotation.length, Some(25));
    assert_eq!(
        annotation.data.keys().copied().collect::<Vec<_>>(),
        vec![0, 10, 20]
    );

    let timestamps: Vec<&str> = annotation
        .data
        .values()
        .map(|frame| frame.timestamp.as_str())
        .collect();
    assert_eq!(timestamps, vec!["14:25:30", "14:25:31", "14:25:32"]);

    let first = &annotation.data[&0];
    assert_eq!(first.cls.label, "smoke");
    assert_eq!(first.cls.conf, 0.875);
    assert!(first.sensors.is_none());

    // skipped frames never reach the classifier or the RGB decode path
    assert_eq!(f.image_classifier.calls(), 3);
    assert_eq!(f.video_decoder.decoded_frames(), 3);
    assert_eq!(f.video_decoder.skipped_frames(), 22);
}

#[test]
fn test_sample_every_zero_classifies_every_frame() {
    let f = Fixture::new(VideoDecoderFake::new(30.0, 4), 0);

    f.video_processor.process(f.request(VIDEO, None));

    let annotation = f.task_registry.result("task-1").unwrap();
    assert_eq!(annotation.data.len(), 4);
}

#[test]
fn test_joins_latest_prior_sensor_reading() {
    let f = Fixture::new(VideoDecoderFake::new(4.0, 9), 2);
    let sensor_path = f.write_sensor_log(SENSORS);

    f.video_processor.process(f.request(VIDEO, Some(sensor_path)));

    let annotation = f.task_registry.result("task-1").unwrap();
    // frames 0,2,4,6,8 at +0s, +0.5s, +1s, +1.5s, +2s
    assert_eq!(
        annotation.data[&0].sensors,
        Some(SensorSnapshot::missing())
    );
    assert_eq!(
        annotation.data[&2].sensors.as_ref().unwrap().temp,
        Some(21.0)
    );
    assert_eq!(
        annotation.data[&4].sensors.as_ref().unwrap().temp,
        Some(22.0)
    );
    assert_eq!(
        annotation.data[&8].sensors.as_ref().unwrap().pm2_5,
        Some(5.0)
    );
}

#[test]
fn test_unreadable_sensor_log_degrades_to_missing_readings() {
    let f = Fixture::new(VideoDecoderFake::new(10.0, 10), 5);
    let sensor_path = f.write_sensor_log("Temp: lukewarm\n");

    f.video_processor.process(f.request(VIDEO, Some(sensor_path)));

    assert_eq!(
        f.task_registry.status("task-1"),
        Some(TaskStatus::Completed)
    );
    let annotation = f.task_registry.result("task-1").unwrap();
    for frame in annotation.data.values() {
        assert_eq!(frame.sensors, Some(SensorSnapshot::missing()));
    }
    assert!(f
        .logger
        .messages_at(LogLevel::Warn)
        .iter()
        .any(|message| message.starts_with("Cannot read sensors")));
}

#[test]
fn test_missing_sensor_file_still_reports_placeholders() {
    let f = Fixture::new(VideoDecoderFake::new(10.0, 1), 1);
    let mut request = f.request(VIDEO, Some(f.dir.path().join("gone.txt")));
    request.include_sensors = true;

    f.video_processor.process(request);

    let annotation = f.task_registry.result("task-1").unwrap();
    assert_eq!(
        annotation.data[&0].sensors,
        Some(SensorSnapshot::missing())
    );
}

#[test]
fn test_filename_without_timestamp() {
    let f = Fixture::new(VideoDecoderFake::new(10.0, 10), 1);

    f.video_processor.process(f.request("holiday.mp4", None));

    assert_eq!(
        f.task_registry.status_label("task-1"),
        "error: cannot parse timestamp from filename"
    );
    assert!(f.task_registry.result("task-1").is_none());
    assert_eq!(f.video_decoder.decoded_frames(), 0);
}

#[test]
fn test_unopenable_video() {
    let f = Fixture::new(VideoDecoderFake::unopenable(), 1);

    f.video_processor.process(f.request(VIDEO, None));

    assert_eq!(
        f.task_registry.status_label("task-1"),
        "error: cannot open video"
    );
    assert_eq!(f.logger.messages_at(LogLevel::Error).len(), 1);
}

#[test]
fn test_classifier_failure_marks_task_failed() {
    let f = Fixture::with_classifier(
        VideoDecoderFake::new(10.0, 10),
        ImageClassifierFake::failing("model exploded"),
        1,
    );

    f.video_processor.process(f.request(VIDEO, None));

    assert_eq!(
        f.task_registry.status_label("task-1"),
        "error: frame 0: classifier failed: model exploded"
    );
}

#[test]
fn test_tiny_frame_rate_fails_instead_of_overflowing() {
    let f = Fixture::new(VideoDecoderFake::new(1e-12, 20), 10);
    f.task_registry.set_status("task-1", TaskStatus::Processing);

    f.video_processor.process(f.request(VIDEO, None));

    assert_eq!(
        f.task_registry.status_label("task-1"),
        "error: frame 10: timestamp out of range"
    );
}

#[tokio::test]
async fn test_worker_panic_marks_task_failed() {
    let f = Fixture::with_classifier(
        VideoDecoderFake::new(10.0, 10),
        ImageClassifierFake::panicking("model exploded"),
        1,
    );
    f.task_registry.set_status("task-1", TaskStatus::Processing);

    f.video_processor
        .spawn(f.request(VIDEO, None))
        .await
        .unwrap();

    assert_eq!(
        f.task_registry.status_label("task-1"),
        "error: processing panicked: model exploded"
    );
    assert!(f
        .logger
        .messages_at(LogLevel::Error)
        .iter()
        .any(|message| message.starts_with("Worker died")));
}

#[test]
fn test_fps_fallback_and_unknown_length() {
    let f = Fixture::new(VideoDecoderFake::new(0.0, 61).without_frame_count(), 30);

    f.video_processor.process(f.request(VIDEO, None));

    let annotation = f.task_registry.result("task-1").unwrap();
    assert_eq!(annotation.length, None);
    assert_eq!(annotation.data[&30].timestamp, "14:25:31");
    assert_eq!(annotation.data[&60].timestamp, "14:25:32");
}

#[test]
fn test_writes_both_result_files() {
    let f = Fixture::new(VideoDecoderFake::new(10.0, 20), 10);

    f.video_processor
        .process(f.request("cam 01 #20240315142530.mp4", None));

    let by_id = read_annotation(&f.dir.path().join("task-1.json")).unwrap();
    let friendly =
        read_annotation(&f.dir.path().join("20240315_142530_cam_01_20240315142530.json"))
            .unwrap();
    assert_eq!(by_id, friendly);
    assert_eq!(by_id, *f.task_registry.result("task-1").unwrap());
}

#[test]
fn test_logs_progress_every_n_frames() {
    let f = Fixture::new(VideoDecoderFake::new(10.0, 120), 10);

    f.video_processor.process(f.request(VIDEO, None));

    let progress: Vec<String> = f
        .logger
        .messages_at(LogLevel::Info)
        .into_iter()
        .filter(|message| message.starts_with("[frame"))
        .collect();
    assert_eq!(
        progress,
        vec![
            "[frame 0] 14:25:30 | cls=smoke(0.875)",
            "[frame 50] 14:25:35 | cls=smoke(0.875)",
            "[frame 100] 14:25:40 | cls=smoke(0.875)",
        ]
    );
}
