use std::io::Write;

use wink_scroll::detect::{EyeContours, EyeLandmarks, EyePair, FaceKeypoints, MeshScheme, Point};
use wink_scroll::replay::RecordedFrame;

/// Six-point eye with corners at (0,0)/(10,0) and both lid pairs at the given heights.
pub fn eye(upper_y: f64, lower_y: f64) -> EyeLandmarks {
    EyeLandmarks {
        edge_l: Point::new(0.0, 0.0),
        edge_r: Point::new(10.0, 0.0),
        upper_l: Point::new(3.0, upper_y),
        upper_r: Point::new(7.0, upper_y),
        lower_l: Point::new(3.0, lower_y),
        lower_r: Point::new(7.0, lower_y),
    }
}

/// EAR 0.18
pub fn squinting_eye() -> EyeLandmarks {
    eye(2.0, 0.2)
}

/// EAR 0.6
pub fn open_eye() -> EyeLandmarks {
    eye(3.0, -3.0)
}

/// EAR 0.0
pub fn closed_eye() -> EyeLandmarks {
    eye(1.0, 1.0)
}

pub fn left_wink() -> EyePair {
    EyePair {
        left: squinting_eye(),
        right: open_eye(),
    }
}

pub fn right_wink() -> EyePair {
    EyePair {
        left: open_eye(),
        right: squinting_eye(),
    }
}

pub fn neutral() -> EyePair {
    EyePair {
        left: open_eye(),
        right: open_eye(),
    }
}

pub fn blink() -> EyePair {
    EyePair {
        left: closed_eye(),
        right: squinting_eye(),
    }
}

/// Places both eyes into a 468-point mesh at the MediaPipe Face Mesh indices.
pub fn mesh_face(pair: EyePair) -> FaceKeypoints {
    let scheme = MeshScheme::mediapipe_facemesh();
    let mut mesh = vec![Point::new(0.0, 0.0); 468];
    for (indices, eye) in [(scheme.left, pair.left), (scheme.right, pair.right)] {
        mesh[indices.edge_l] = eye.edge_l;
        mesh[indices.edge_r] = eye.edge_r;
        mesh[indices.upper_l] = eye.upper_l;
        mesh[indices.upper_r] = eye.upper_r;
        mesh[indices.lower_l] = eye.lower_l;
        mesh[indices.lower_r] = eye.lower_r;
    }
    FaceKeypoints::Mesh { mesh }
}

/// Builds 7-point upper and 9-point lower contours matching the facemesh annotations.
pub fn contour_face(pair: EyePair) -> FaceKeypoints {
    let contours = |eye: EyeLandmarks| {
        let filler = Point::new(5.0, 0.0);
        let mut upper = vec![filler; 7];
        let mut lower = vec![filler; 9];
        lower[0] = eye.edge_l;
        lower[8] = eye.edge_r;
        upper[2] = eye.upper_l;
        upper[4] = eye.upper_r;
        lower[3] = eye.lower_l;
        lower[5] = eye.lower_r;
        (upper, lower)
    };
    let (left_upper, left_lower) = contours(pair.left);
    let (right_upper, right_lower) = contours(pair.right);
    FaceKeypoints::Contours(EyeContours {
        left_upper,
        left_lower,
        right_upper,
        right_lower,
    })
}

pub fn frame(faces: Vec<FaceKeypoints>) -> RecordedFrame {
    RecordedFrame {
        timestamp_ms: None,
        faces,
    }
}

/// Writes a JSON Lines recording; raw lines are written verbatim.
pub fn write_recording(lines: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp recording");
    for line in lines {
        writeln!(file, "{line}").expect("write recording line");
    }
    file.flush().expect("flush recording");
    file
}

pub fn frame_line(frame: &RecordedFrame) -> String {
    serde_json::to_string(frame).expect("serialize frame")
}
