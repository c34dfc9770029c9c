//! 骰子与眼数计数器

use rand::seq::index;
use rand::Rng;

use super::pieces::{PieceColor, Point, Rect, BOARD_HEIGHT, BOARD_WIDTH};

/// 骰子边长
pub const DIE_SIZE: i32 = 64;

/// 两颗骰子中心的纵向半间距
const DIE_SPACING: i32 = 40;

/// 偏移取值范围 [-JITTER_RANGE, JITTER_RANGE)
const JITTER_RANGE: i32 = 10;

/// 显示用的随机扰动，不参与同步
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceJitter {
    /// 每颗骰子的旋转角度（度），互不相同
    pub rotation: [u16; 2],
    /// 像素偏移 [x0, y0, x1, y1]，互不相同
    pub offset: [i32; 4],
}

impl DiceJitter {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let angles = index::sample(rng, 360, 2);
        let offsets = index::sample(rng, (JITTER_RANGE * 2) as usize, 4);

        let mut rotation = [0u16; 2];
        for (slot, value) in rotation.iter_mut().zip(angles.iter()) {
            *slot = value as u16;
        }
        let mut offset = [0i32; 4];
        for (slot, value) in offset.iter_mut().zip(offsets.iter()) {
            *slot = value as i32 - JITTER_RANGE;
        }

        Self { rotation, offset }
    }
}

/// 一对骰子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DicePair {
    values: (u8, u8),
    jitter: DiceJitter,
}

impl DicePair {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            values: roll_values(rng),
            jitter: DiceJitter::random(rng),
        }
    }

    pub fn values(&self) -> (u8, u8) {
        self.values
    }

    pub fn jitter(&self) -> &DiceJitter {
        &self.jitter
    }

    pub fn is_double(&self) -> bool {
        self.values.0 == self.values.1
    }

    /// 本地掷骰：生成新点数
    pub fn roll<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (u8, u8) {
        self.values = roll_values(rng);
        self.jitter = DiceJitter::random(rng);
        self.values
    }

    /// 采用对方的点数，只重新生成扰动
    pub fn adopt<R: Rng + ?Sized>(&mut self, values: (u8, u8), rng: &mut R) {
        self.values = values;
        self.jitter = DiceJitter::random(rng);
    }

    pub fn rejitter<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.jitter = DiceJitter::random(rng);
    }

    /// 第 i 颗骰子（0 或 1）的绘制中心
    pub fn die_center(&self, i: usize) -> Point {
        let dx = self.jitter.offset[2 * i];
        let dy = self.jitter.offset[2 * i + 1];
        let row = 2 * i as i32 - 1;
        Point::new(
            BOARD_WIDTH / 2 + dx,
            BOARD_HEIGHT / 2 + DIE_SPACING * row + dy,
        )
    }

    pub fn die_rect(&self, i: usize) -> Rect {
        Rect::centered(self.die_center(i), DIE_SIZE, DIE_SIZE)
    }

    /// 点击是否落在任一骰子上
    pub fn hit(&self, p: Point) -> bool {
        (0..2).any(|i| self.die_rect(i).contains(p))
    }
}

fn roll_values<R: Rng + ?Sized>(rng: &mut R) -> (u8, u8) {
    (rng.gen_range(1..=6), rng.gen_range(1..=6))
}

/// 两种颜色的眼数计数器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EyeCounters([u32; 2]);

impl EyeCounters {
    pub fn get(&self, color: PieceColor) -> u32 {
        self.0[color.index()]
    }

    /// 调整计数，不低于 0
    pub fn adjust(&mut self, color: PieceColor, delta: i32) {
        let slot = &mut self.0[color.index()];
        *slot = if delta >= 0 {
            slot.saturating_add(delta.unsigned_abs())
        } else {
            slot.saturating_sub(delta.unsigned_abs())
        };
    }

    pub fn clear(&mut self) {
        self.0 = [0; 2];
    }
}

impl From<(u32, u32)> for EyeCounters {
    fn from((black, white): (u32, u32)) -> Self {
        Self([black, white])
    }
}

impl From<EyeCounters> for (u32, u32) {
    fn from(eyes: EyeCounters) -> Self {
        (eyes.0[0], eyes.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_roll_values_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut dice = DicePair::random(&mut rng);
        for _ in 0..500 {
            let (a, b) = dice.roll(&mut rng);
            assert!((1..=6).contains(&a));
            assert!((1..=6).contains(&b));
        }
    }

    #[test]
    fn test_jitter_distinct_and_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let jitter = DiceJitter::random(&mut rng);
            assert_ne!(jitter.rotation[0], jitter.rotation[1]);
            assert!(jitter.rotation.iter().all(|r| *r < 360));

            for (i, a) in jitter.offset.iter().enumerate() {
                assert!((-10..10).contains(a));
                for b in &jitter.offset[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_adopt_keeps_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut dice = DicePair::random(&mut rng);
        dice.adopt((4, 4), &mut rng);
        assert_eq!(dice.values(), (4, 4));
        assert!(dice.is_double());
    }

    #[test]
    fn test_die_hit_box() {
        let mut rng = StdRng::seed_from_u64(3);
        let dice = DicePair::random(&mut rng);
        assert!(dice.hit(dice.die_center(0)));
        assert!(dice.hit(dice.die_center(1)));
        assert!(!dice.hit(Point::new(10, 10)));
    }

    #[test]
    fn test_eye_counters_saturate() {
        let mut eyes = EyeCounters::default();
        eyes.adjust(PieceColor::White, 3);
        eyes.adjust(PieceColor::Black, -2);
        assert_eq!(<(u32, u32)>::from(eyes), (0, 3));

        eyes.adjust(PieceColor::White, -1);
        assert_eq!(eyes.get(PieceColor::White), 2);

        eyes.clear();
        assert_eq!(eyes, EyeCounters::default());
    }
}
