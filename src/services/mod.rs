mod video_url;

pub use video_url::extract_video_id;
