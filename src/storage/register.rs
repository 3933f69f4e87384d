use super::memory_driver::{MemoryDriver, MEMORY_DRIVER};
use super::redis_driver::{RedisDriver, REDIS_DRIVER};
use super::registry::Registry;

/// 注册 redis 驱动
///
/// # Panics
///
/// 同一个注册表中 `redis` 已被注册时 panic
pub fn register_redis_driver(registry: &Registry) {
    registry.register(REDIS_DRIVER, RedisDriver);
}

/// 注册 memory 驱动，数据为空
///
/// 需要在注册后修改数据时，自行创建 [`MemoryDriver`] 并保留一份克隆再注册
pub fn register_memory_driver(registry: &Registry) {
    registry.register(MEMORY_DRIVER, MemoryDriver::new());
}

/// 注册所有内置驱动
///
/// # 示例
/// ```ignore
/// use appconf::storage::{register_drivers, Registry};
///
/// let registry = Registry::new();
/// register_drivers(&registry);
/// assert!(registry.contains("redis"));
/// ```
pub fn register_drivers(registry: &Registry) {
    register_redis_driver(registry);
    register_memory_driver(registry);
}
