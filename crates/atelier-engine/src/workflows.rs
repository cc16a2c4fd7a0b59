//! Job graph builders
//!
//! Engine-specific declarative pipelines with prompt/seed/input parameters
//! substituted in. Node ids are fixed contracts: the save node ("9") is
//! where the poller looks for reported outputs.

/// Save node id shared by both graphs.
pub const SAVE_NODE: &str = "9";

/// Filename prefix the engine is asked to write image outputs under.
pub const IMAGE_FILENAME_PREFIX: &str = "atelier/generated_";

/// Filename prefix for video outputs.
pub const VIDEO_FILENAME_PREFIX: &str = "HV15Out/vid";

/// Random seed in the engine's accepted range.
pub fn random_seed() -> u64 {
    rand::random::<u64>() % 999_999_999_999_999
}

/// Text-to-image pipeline: checkpoint -> prompts -> sampler -> decode -> save.
pub fn build_image_graph(prompt: &str, negative_prompt: &str, seed: u64) -> serde_json::Value {
    serde_json::json!({
        "3": {
            "inputs": {
                "seed": seed,
                "steps": 20,
                "cfg": 7.5,
                "sampler_name": "euler",
                "scheduler": "normal",
                "denoise": 1.0,
                "model": ["4", 0],
                "positive": ["6", 0],
                "negative": ["38", 0],
                "latent_image": ["5", 0]
            },
            "class_type": "KSampler"
        },
        "4": {
            "inputs": { "ckpt_name": "sd_xl_base_1.0.safetensors" },
            "class_type": "CheckpointLoaderSimple"
        },
        "5": {
            "inputs": { "width": 1024, "height": 1024, "batch_size": 1 },
            "class_type": "EmptyLatentImage"
        },
        "6": {
            "inputs": { "text": prompt, "clip": ["4", 1] },
            "class_type": "CLIPTextEncode"
        },
        "38": {
            "inputs": { "text": negative_prompt, "clip": ["4", 1] },
            "class_type": "CLIPTextEncode"
        },
        "8": {
            "inputs": { "samples": ["3", 0], "vae": ["4", 2] },
            "class_type": "VAEDecode"
        },
        SAVE_NODE: {
            "inputs": {
                "filename_prefix": IMAGE_FILENAME_PREFIX,
                "images": ["8", 0]
            },
            "class_type": "SaveImage"
        }
    })
}

/// Image-to-video pipeline. `input_image` must be the engine-assigned name
/// returned by the input upload, verbatim.
pub fn build_video_graph(
    prompt: &str,
    negative_prompt: &str,
    input_image: &str,
) -> serde_json::Value {
    serde_json::json!({
        "3": {
            "inputs": { "text": prompt, "clip": ["11", 0] },
            "class_type": "CLIPTextEncode"
        },
        "4": {
            "inputs": { "text": negative_prompt, "clip": ["11", 0] },
            "class_type": "CLIPTextEncode"
        },
        "11": {
            "inputs": { "clip_name": "clip_l.safetensors", "type": "hunyuan_video" },
            "class_type": "CLIPLoader"
        },
        "12": {
            "inputs": { "unet_name": "hunyuan_video_720.safetensors" },
            "class_type": "UNETLoader"
        },
        "13": {
            "inputs": { "image": input_image },
            "class_type": "LoadImage"
        },
        "14": {
            "inputs": { "vae_name": "hunyuan_video_vae.safetensors" },
            "class_type": "VAELoader"
        },
        "15": {
            "inputs": {
                "seed": random_seed(),
                "steps": 20,
                "cfg": 6.0,
                "sampler_name": "euler",
                "scheduler": "simple",
                "denoise": 1.0,
                "model": ["12", 0],
                "positive": ["3", 0],
                "negative": ["4", 0],
                "latent_image": ["16", 0]
            },
            "class_type": "KSampler"
        },
        "16": {
            "inputs": { "width": 512, "height": 512, "length": 73, "batch_size": 1, "image": ["13", 0] },
            "class_type": "ImageToVideoLatent"
        },
        "17": {
            "inputs": { "samples": ["15", 0], "vae": ["14", 0] },
            "class_type": "VAEDecode"
        },
        SAVE_NODE: {
            "inputs": {
                "filename_prefix": VIDEO_FILENAME_PREFIX,
                "frame_rate": 24,
                "format": "video/h264-mp4",
                "images": ["17", 0]
            },
            "class_type": "VHS_VideoCombine"
        }
    })
}
