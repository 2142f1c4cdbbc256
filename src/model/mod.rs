pub mod change_set;
pub mod commit;
pub mod issue;
pub mod user_map;
pub mod work_item;
