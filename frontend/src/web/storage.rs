//! 本地存储封装模块
//!
//! 使用 `web_sys::Storage` 提供简洁的键值存储接口。
//! 业务模块只依赖 `KeyValueStorage` trait，测试时替换为内存实现。

/// 键值存储抽象
///
/// 所有操作都不会 panic：存储不可用时读取返回 `None`，写入返回 `false`。
pub trait KeyValueStorage {
    /// 获取存储的字符串值
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除存储的键值对，返回操作是否成功
    fn delete(&self, key: &str) -> bool;
}

/// 浏览器 LocalStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    /// 获取 LocalStorage 实例
    ///
    /// 隐私模式或禁用存储时返回 `None`
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

// =========================================================
// 测试实现 (Mock)
// =========================================================

#[cfg(test)]
pub use self::memory::MemoryStorage;

#[cfg(test)]
mod memory {
    use super::KeyValueStorage;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    /// 内存存储，克隆体共享同一份数据
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStorage {
        items: Rc<RefCell<HashMap<String, String>>>,
        fail_writes: Rc<Cell<bool>>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// 模拟配额耗尽：之后的写入全部失败
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.set(fail);
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.items.borrow().get(key).cloned()
        }

        pub fn put_raw(&self, key: &str, value: &str) {
            self.items
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }
    }

    impl KeyValueStorage for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.raw(key)
        }

        fn set(&self, key: &str, value: &str) -> bool {
            if self.fail_writes.get() {
                return false;
            }
            self.put_raw(key, value);
            true
        }

        fn delete(&self, key: &str) -> bool {
            if self.fail_writes.get() {
                return false;
            }
            self.items.borrow_mut().remove(key);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_shares_state_between_clones() {
        let a = MemoryStorage::new();
        let b = a.clone();
        assert!(a.set("k", "v"));
        assert_eq!(b.get("k").as_deref(), Some("v"));
        assert!(b.delete("k"));
        assert_eq!(a.get("k"), None);
    }

    #[test]
    fn test_failed_writes_leave_data_untouched() {
        let storage = MemoryStorage::new();
        storage.put_raw("k", "old");
        storage.fail_writes(true);
        assert!(!storage.set("k", "new"));
        assert!(!storage.delete("k"));
        assert_eq!(storage.get("k").as_deref(), Some("old"));
    }
}
