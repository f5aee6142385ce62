//! 仪表盘状态数据结构

use crate::models::RefillState;
use chrono::{DateTime, Local};
use rand::Rng;
use std::collections::VecDeque;
use tracing::warn;

/// 重量单位
pub const WEIGHT_UNIT: &str = "g";
/// 碗宽（画布坐标）
pub const BOWL_WIDTH: f64 = 300.0;
/// 碗高（画布坐标）
pub const BOWL_HEIGHT: f64 = 150.0;
/// 食物颗粒半径
pub const FOOD_RADIUS: f64 = 5.0;
/// 满碗时的颗粒数
pub const FOOD_DENSITY: f64 = 700.0;
/// 单次补充颗粒的最大尝试次数
const PLACEMENT_ATTEMPTS: usize = 1000;
/// 告警面板保留条数
pub const ALERT_HISTORY: usize = 50;

/// 碗内食物颗粒（画布坐标，原点为碗心）
#[derive(Debug, Clone, Default)]
pub struct FoodLayer {
    pellets: Vec<(f64, f64)>,
}

impl FoodLayer {
    pub fn pellets(&self) -> &[(f64, f64)] {
        &self.pellets
    }

    pub fn len(&self) -> usize {
        self.pellets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pellets.is_empty()
    }

    /// 在碗内随机补充不重叠的颗粒，超出目标数量时裁掉多余的
    pub fn grow<R: Rng + ?Sized>(&mut self, target: usize, rng: &mut R) {
        let half_w = BOWL_WIDTH / 2.0;
        let half_h = BOWL_HEIGHT / 2.0;
        let min_dist_sq = (2.0 * FOOD_RADIUS).powi(2);

        let mut attempts = 0;
        while self.pellets.len() < target && attempts < PLACEMENT_ATTEMPTS {
            attempts += 1;
            let x = rng.random_range(-half_w + FOOD_RADIUS..=half_w - FOOD_RADIUS);
            let y = rng.random_range(-half_h + FOOD_RADIUS..=half_h - FOOD_RADIUS);

            if (x / half_w).powi(2) + (y / half_h).powi(2) > 1.0 {
                continue;
            }
            let overlaps = self
                .pellets
                .iter()
                .any(|(px, py)| (x - px).powi(2) + (y - py).powi(2) < min_dist_sq);
            if !overlaps {
                self.pellets.push((x, y));
            }
        }

        self.shrink(target);
    }

    /// 移除多余颗粒（后放的先移除）
    pub fn shrink(&mut self, target: usize) {
        self.pellets.truncate(target);
    }
}

/// 当前重量对应的颗粒数
pub fn food_count(current_weight: f64, capacity: f64) -> usize {
    if capacity > 0.0 {
        (current_weight / capacity * FOOD_DENSITY).ceil().max(0.0) as usize
    } else {
        0
    }
}

/// 告警条目
#[derive(Debug, Clone)]
pub struct AlertItem {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

/// 碗的显示状态
#[derive(Debug, Clone)]
pub struct BowlState {
    pub capacity: f64,
    pub current_weight: f64,
    pub target_weight: f64,
    pub refill_state: RefillState,
    /// 上次绘制时的重量，用来判断是加料还是减料
    pub last_visual_weight: f64,
    pub food: FoodLayer,
    pub alerts: VecDeque<AlertItem>,
    /// 待确认的错误弹窗
    pub denial: Option<String>,
    pub transport_status: String,
}

impl Default for BowlState {
    fn default() -> Self {
        Self {
            capacity: 1.0,
            current_weight: 0.0,
            target_weight: 0.0,
            refill_state: RefillState::Off,
            last_visual_weight: 0.0,
            food: FoodLayer::default(),
            alerts: VecDeque::with_capacity(ALERT_HISTORY),
            denial: None,
            transport_status: "connecting".to_string(),
        }
    }
}

impl BowlState {
    pub fn set_capacity_value(&mut self, capacity: f64) {
        self.capacity = capacity;
    }

    pub fn set_current_weight<R: Rng + ?Sized>(&mut self, weight: f64, rng: &mut R) {
        self.current_weight = weight;
        let is_ascending = weight > self.last_visual_weight;
        self.last_visual_weight = weight;

        let target = food_count(self.current_weight, self.capacity);
        if is_ascending {
            self.food.grow(target, rng);
        } else {
            self.food.shrink(target);
        }
    }

    pub fn set_target_weight(&mut self, weight: f64) {
        self.target_weight = weight;
    }

    /// 非 0/1 的值保持原状态
    pub fn set_refill_state(&mut self, state: i64) {
        match RefillState::try_from(state) {
            Ok(s) => self.refill_state = s,
            Err(v) => warn!(state = v, "Ignoring unknown refill state"),
        }
    }

    pub fn push_alert(&mut self, message: String) {
        if self.alerts.len() == ALERT_HISTORY {
            self.alerts.pop_front();
        }
        self.alerts.push_back(AlertItem {
            timestamp: Local::now(),
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.current_weight == 0.0
    }
}
