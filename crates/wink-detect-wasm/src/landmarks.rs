//! 关键点索引映射
//!
//! 不同版本的人脸关键点模型对眼角、眼睑点使用不同的编号方式：
//! - 稠密网格模型 (MediaPipe Face Mesh 468点) 按固定索引取6个点
//! - 较早的轮廓模型按眼睑上下轮廓数组的位置取点
//!
//! 两种方案各自维护一张映射表，启动时选定其一，不会混用。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ear::{EyeLandmarks, Point};

/// 同一张脸的左右眼6点关键点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyePair {
    pub left: EyeLandmarks,
    pub right: EyeLandmarks,
}

/// 把某个模型输出的一张脸映射为左右眼6点关键点
pub trait LandmarkScheme {
    type Face;

    fn name(&self) -> &'static str;

    /// 关键点缺失或结构不匹配时返回 `None`，该脸在本帧不可操作
    fn eyes(&self, face: &Self::Face) -> Option<EyePair>;
}

/// 宿主已经提取好6点关键点时使用的直通方案
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SixPointScheme;

impl LandmarkScheme for SixPointScheme {
    type Face = EyePair;

    fn name(&self) -> &'static str {
        "six-point"
    }

    fn eyes(&self, face: &EyePair) -> Option<EyePair> {
        Some(*face)
    }
}

/// 稠密网格中一只眼睛的6个索引
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeIndices {
    pub edge_l: usize,
    pub edge_r: usize,
    pub upper_l: usize,
    pub upper_r: usize,
    pub lower_l: usize,
    pub lower_r: usize,
}

impl EyeIndices {
    fn pick(&self, mesh: &[Point]) -> Option<EyeLandmarks> {
        Some(EyeLandmarks {
            edge_l: *mesh.get(self.edge_l)?,
            edge_r: *mesh.get(self.edge_r)?,
            upper_l: *mesh.get(self.upper_l)?,
            upper_r: *mesh.get(self.upper_r)?,
            lower_l: *mesh.get(self.lower_l)?,
            lower_r: *mesh.get(self.lower_r)?,
        })
    }

    fn max_index(&self) -> usize {
        [
            self.edge_l,
            self.edge_r,
            self.upper_l,
            self.upper_r,
            self.lower_l,
            self.lower_r,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// 稠密网格方案
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshScheme {
    pub left: EyeIndices,
    pub right: EyeIndices,
}

impl MeshScheme {
    /// MediaPipe Face Mesh (468/478点)，左右以被拍摄者为准
    pub const fn mediapipe_facemesh() -> Self {
        Self {
            left: EyeIndices {
                edge_l: 263,
                edge_r: 362,
                upper_l: 387,
                upper_r: 385,
                lower_l: 373,
                lower_r: 380,
            },
            right: EyeIndices {
                edge_l: 33,
                edge_r: 133,
                upper_l: 160,
                upper_r: 158,
                lower_l: 144,
                lower_r: 153,
            },
        }
    }

    /// 网格至少需要的点数
    pub fn min_points(&self) -> usize {
        self.left.max_index().max(self.right.max_index()) + 1
    }
}

impl LandmarkScheme for MeshScheme {
    type Face = Vec<Point>;

    fn name(&self) -> &'static str {
        "mesh"
    }

    fn eyes(&self, mesh: &Vec<Point>) -> Option<EyePair> {
        Some(EyePair {
            left: self.left.pick(mesh)?,
            right: self.right.pick(mesh)?,
        })
    }
}

/// 单张脸的眼睑轮廓数组
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeContours {
    pub left_upper: Vec<Point>,
    pub left_lower: Vec<Point>,
    pub right_upper: Vec<Point>,
    pub right_lower: Vec<Point>,
}

/// 轮廓方案：眼角取下眼睑轮廓首尾两点，眼睑点按位置取
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContourScheme {
    pub upper_l: usize,
    pub upper_r: usize,
    pub lower_l: usize,
    pub lower_r: usize,
}

impl ContourScheme {
    /// facemesh 的 `*EyeUpper0` / `*EyeLower0` 标注（上7点，下9点）
    pub const fn facemesh_annotations() -> Self {
        Self {
            upper_l: 2,
            upper_r: 4,
            lower_l: 3,
            lower_r: 5,
        }
    }

    fn pick(&self, upper: &[Point], lower: &[Point]) -> Option<EyeLandmarks> {
        if lower.len() < 2 {
            return None;
        }
        Some(EyeLandmarks {
            edge_l: *lower.first()?,
            edge_r: *lower.last()?,
            upper_l: *upper.get(self.upper_l)?,
            upper_r: *upper.get(self.upper_r)?,
            lower_l: *lower.get(self.lower_l)?,
            lower_r: *lower.get(self.lower_r)?,
        })
    }
}

impl LandmarkScheme for ContourScheme {
    type Face = EyeContours;

    fn name(&self) -> &'static str {
        "contours"
    }

    fn eyes(&self, face: &EyeContours) -> Option<EyePair> {
        Some(EyePair {
            left: self.pick(&face.left_upper, &face.left_lower)?,
            right: self.pick(&face.right_upper, &face.right_lower)?,
        })
    }
}

/// 模型无关的人脸关键点，供录制回放和 JS 侧统一传入
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceKeypoints {
    Mesh { mesh: Vec<Point> },
    Contours(EyeContours),
}

/// 启动时选定的关键点模型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandmarkModel {
    Mesh(MeshScheme),
    Contours(ContourScheme),
}

impl LandmarkModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mesh(_) => "mediapipe-facemesh",
            Self::Contours(_) => "facemesh-contours",
        }
    }
}

impl Default for LandmarkModel {
    fn default() -> Self {
        Self::Mesh(MeshScheme::mediapipe_facemesh())
    }
}

impl fmt::Display for LandmarkModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mediapipe-facemesh" | "mesh" => Ok(Self::Mesh(MeshScheme::mediapipe_facemesh())),
            "facemesh-contours" | "contours" => {
                Ok(Self::Contours(ContourScheme::facemesh_annotations()))
            }
            other => Err(format!("unknown landmark model: {other}")),
        }
    }
}

impl LandmarkScheme for LandmarkModel {
    type Face = FaceKeypoints;

    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn eyes(&self, face: &FaceKeypoints) -> Option<EyePair> {
        match (self, face) {
            (Self::Mesh(scheme), FaceKeypoints::Mesh { mesh }) => scheme.eyes(mesh),
            (Self::Contours(scheme), FaceKeypoints::Contours(contours)) => scheme.eyes(contours),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ear::eye_aspect_ratio;

    fn mesh_with(indices: &EyeIndices, eye: &EyeLandmarks, mesh: &mut [Point]) {
        mesh[indices.edge_l] = eye.edge_l;
        mesh[indices.edge_r] = eye.edge_r;
        mesh[indices.upper_l] = eye.upper_l;
        mesh[indices.upper_r] = eye.upper_r;
        mesh[indices.lower_l] = eye.lower_l;
        mesh[indices.lower_r] = eye.lower_r;
    }

    fn open_eye() -> EyeLandmarks {
        EyeLandmarks {
            edge_l: Point::new(0.0, 0.0),
            edge_r: Point::new(10.0, 0.0),
            upper_l: Point::new(3.0, 3.0),
            upper_r: Point::new(7.0, 3.0),
            lower_l: Point::new(3.0, -3.0),
            lower_r: Point::new(7.0, -3.0),
        }
    }

    #[test]
    fn facemesh_preset_min_points() {
        assert_eq!(MeshScheme::mediapipe_facemesh().min_points(), 388);
        assert_eq!(MeshScheme::mediapipe_facemesh().right.lower_r, 153);
    }

    #[test]
    fn mesh_scheme_picks_by_index() {
        let scheme = MeshScheme::mediapipe_facemesh();
        let mut mesh = vec![Point::new(0.0, 0.0); 468];
        mesh_with(&scheme.left, &open_eye(), &mut mesh);

        let pair = scheme.eyes(&mesh).expect("full mesh");
        assert_eq!(pair.left, open_eye());
        assert_eq!(eye_aspect_ratio(&pair.left), Some(0.6));
        // 右眼全部为原点，眼角重合
        assert_eq!(eye_aspect_ratio(&pair.right), None);
    }

    #[test]
    fn short_mesh_is_not_actionable() {
        let scheme = MeshScheme::mediapipe_facemesh();
        let mesh = vec![Point::new(0.0, 0.0); 200];
        assert!(scheme.eyes(&mesh).is_none());
    }

    #[test]
    fn contour_scheme_uses_positions() {
        let lower: Vec<Point> = (0..9).map(|i| Point::new(i as f64, -1.0)).collect();
        let upper: Vec<Point> = (0..7).map(|i| Point::new(i as f64, 1.0)).collect();
        let face = EyeContours {
            left_upper: upper.clone(),
            left_lower: lower.clone(),
            right_upper: upper,
            right_lower: lower,
        };

        let pair = ContourScheme::facemesh_annotations()
            .eyes(&face)
            .expect("full contours");
        assert_eq!(pair.left.edge_l, Point::new(0.0, -1.0));
        assert_eq!(pair.left.edge_r, Point::new(8.0, -1.0));
        assert_eq!(pair.left.upper_r, Point::new(4.0, 1.0));
        assert_eq!(pair.left.lower_r, Point::new(5.0, -1.0));
    }

    #[test]
    fn short_contours_are_not_actionable() {
        let face = EyeContours {
            left_upper: vec![Point::new(0.0, 0.0); 3],
            left_lower: vec![Point::new(0.0, 0.0); 9],
            right_upper: vec![Point::new(0.0, 0.0); 7],
            right_lower: vec![Point::new(0.0, 0.0); 9],
        };
        assert!(ContourScheme::facemesh_annotations().eyes(&face).is_none());
    }

    #[test]
    fn model_never_mixes_schemes() {
        let mesh_model: LandmarkModel = "mediapipe-facemesh".parse().unwrap();
        let contour_face = FaceKeypoints::Contours(EyeContours::default());
        assert!(mesh_model.eyes(&contour_face).is_none());

        let contour_model: LandmarkModel = "facemesh-contours".parse().unwrap();
        let mesh_face = FaceKeypoints::Mesh {
            mesh: vec![Point::new(1.0, 1.0); 468],
        };
        assert!(contour_model.eyes(&mesh_face).is_none());
    }

    #[test]
    fn unknown_model_name_is_rejected() {
        assert!("blazeface".parse::<LandmarkModel>().is_err());
        assert_eq!(LandmarkModel::default().to_string(), "mediapipe-facemesh");
    }

    #[test]
    fn face_keypoints_deserialize_by_shape() {
        let mesh: FaceKeypoints = serde_json::from_str(r#"{"mesh": [[1, 2], [3, 4, 5]]}"#).unwrap();
        assert!(matches!(mesh, FaceKeypoints::Mesh { ref mesh } if mesh.len() == 2));

        let contours: FaceKeypoints = serde_json::from_str(
            r#"{"leftUpper": [], "leftLower": [], "rightUpper": [], "rightLower": [[0, 0]]}"#,
        )
        .unwrap();
        assert!(matches!(contours, FaceKeypoints::Contours(_)));
    }
}
