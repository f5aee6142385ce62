//! Bowl GUI 能力接口

/// 补料按钮回调
pub type RefillCallback = Box<dyn Fn() + Send + Sync>;

/// 提议新目标重量回调
pub type ProposeTargetCallback = Box<dyn Fn(i64) + Send + Sync>;

/// 中介者需要的 GUI 能力
///
/// 实现方可能被串口读取线程调用，方法都取 `&self`，
/// 由实现自行决定如何把修改调度到 UI 线程。
pub trait BowlGui: Send + Sync {
    fn set_capacity_value(&self, capacity: f64);

    fn set_current_weight(&self, weight: f64);

    fn set_target_weight(&self, weight: f64);

    fn set_refill_state(&self, state: i64);

    fn set_refill_callback(&self, callback: RefillCallback);

    fn set_propose_new_target_weight_callback(&self, callback: ProposeTargetCallback);

    fn on_new_target_proposal_denial(&self, error_message: &str);
}
