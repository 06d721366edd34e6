mod video_processor_test;
