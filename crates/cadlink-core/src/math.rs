//! 坐标类型

/// 三维点（宿主的 AddLine 接收三元坐标）
pub type Point3 = nalgebra::Point3<f64>;

/// 将平面坐标提升为 z = 0 的三维点
#[inline]
pub fn on_plane(x: f64, y: f64) -> Point3 {
    Point3::new(x, y, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_plane() {
        let p = on_plane(12.5, -3.0);
        assert_eq!(p.x, 12.5);
        assert_eq!(p.y, -3.0);
        assert_eq!(p.z, 0.0);
    }
}
