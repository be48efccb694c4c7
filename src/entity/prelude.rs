//! 预导入模块，方便使用

pub use super::evaluations::{Entity as Evaluations, Model as EvaluationModel};
pub use super::group_members::{Entity as GroupMembers, Model as GroupMemberModel};
pub use super::groups::{Entity as Groups, Model as GroupModel};
pub use super::point_entries::{Entity as PointEntries, Model as PointEntryModel};
pub use super::task_appeals::{Entity as TaskAppeals, Model as TaskAppealModel};
pub use super::task_assignees::{Entity as TaskAssignees, Model as TaskAssigneeModel};
pub use super::task_grades::{Entity as TaskGrades, Model as TaskGradeModel};
pub use super::tasks::{Entity as Tasks, Model as TaskModel};
pub use super::users::{Entity as Users, Model as UserModel};
