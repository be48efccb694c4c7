use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::AvatarUrl).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建项目小组表
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Groups::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Groups::Description).text().null())
                    .col(ColumnDef::new(Groups::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Groups::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Groups::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Groups::Table, Groups::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建小组成员表
        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GroupMembers::GroupId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GroupMembers::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GroupMembers::JoinedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupMembers::Table, GroupMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建任务表
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text().null())
                    .col(ColumnDef::new(Tasks::Status).string().not_null())
                    .col(ColumnDef::new(Tasks::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tasks::Table, Tasks::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tasks::Table, Tasks::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建任务负责人表
        manager
            .create_table(
                Table::create()
                    .table(TaskAssignees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskAssignees::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskAssignees::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(TaskAssignees::UserId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskAssignees::Table, TaskAssignees::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskAssignees::Table, TaskAssignees::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建任务评分表
        manager
            .create_table(
                Table::create()
                    .table(TaskGrades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskGrades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskGrades::TaskId).big_integer().not_null())
                    .col(
                        ColumnDef::new(TaskGrades::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TaskGrades::GraderId).big_integer().not_null())
                    .col(ColumnDef::new(TaskGrades::Points).double().not_null())
                    .col(ColumnDef::new(TaskGrades::Feedback).text().null())
                    .col(ColumnDef::new(TaskGrades::GradedAt).big_integer().not_null())
                    .col(
                        ColumnDef::new(TaskGrades::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskGrades::Table, TaskGrades::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskGrades::Table, TaskGrades::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskGrades::Table, TaskGrades::GraderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评分申诉表
        manager
            .create_table(
                Table::create()
                    .table(TaskAppeals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskAppeals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskAppeals::TaskId).big_integer().not_null())
                    .col(
                        ColumnDef::new(TaskAppeals::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TaskAppeals::Reason).text().not_null())
                    .col(ColumnDef::new(TaskAppeals::Status).string().not_null())
                    .col(ColumnDef::new(TaskAppeals::Resolution).text().null())
                    .col(ColumnDef::new(TaskAppeals::ResolvedBy).big_integer().null())
                    .col(
                        ColumnDef::new(TaskAppeals::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TaskAppeals::ResolvedAt).big_integer().null())
                    .col(ColumnDef::new(TaskAppeals::PendingSlot).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskAppeals::Table, TaskAppeals::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskAppeals::Table, TaskAppeals::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskAppeals::Table, TaskAppeals::ResolvedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建基础积分流水表（测验、作业、额外加分）
        manager
            .create_table(
                Table::create()
                    .table(PointEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointEntries::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointEntries::Source).string().not_null())
                    .col(ColumnDef::new(PointEntries::Label).string().not_null())
                    .col(ColumnDef::new(PointEntries::Points).double().not_null())
                    .col(
                        ColumnDef::new(PointEntries::AwardedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointEntries::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PointEntries::Table, PointEntries::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PointEntries::Table, PointEntries::AwardedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        // 同一成员在同一小组只能出现一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_group_members_group_user")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .col(GroupMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_group_id")
                    .table(Tasks::Table)
                    .col(Tasks::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_assignees_task_user")
                    .table(TaskAssignees::Table)
                    .col(TaskAssignees::TaskId)
                    .col(TaskAssignees::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 每个 (任务, 学生) 最多一条评分
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_grades_task_student")
                    .table(TaskGrades::Table)
                    .col(TaskGrades::TaskId)
                    .col(TaskGrades::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_grades_student_id")
                    .table(TaskGrades::Table)
                    .col(TaskGrades::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_appeals_task_student")
                    .table(TaskAppeals::Table)
                    .col(TaskAppeals::TaskId)
                    .col(TaskAppeals::StudentId)
                    .to_owned(),
            )
            .await?;

        // 待处理申诉占位为 1，处理后置空；NULL 不参与唯一约束
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_appeals_pending")
                    .table(TaskAppeals::Table)
                    .col(TaskAppeals::TaskId)
                    .col(TaskAppeals::StudentId)
                    .col(TaskAppeals::PendingSlot)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_point_entries_student_id")
                    .table(PointEntries::Table)
                    .col(PointEntries::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(PointEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskAppeals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskGrades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskAssignees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    DisplayName,
    AvatarUrl,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Groups {
    #[sea_orm(iden = "groups")]
    Table,
    Id,
    Name,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GroupMembers {
    #[sea_orm(iden = "group_members")]
    Table,
    Id,
    GroupId,
    UserId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    #[sea_orm(iden = "tasks")]
    Table,
    Id,
    GroupId,
    Title,
    Description,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TaskAssignees {
    #[sea_orm(iden = "task_assignees")]
    Table,
    Id,
    TaskId,
    UserId,
}

#[derive(DeriveIden)]
enum TaskGrades {
    #[sea_orm(iden = "task_grades")]
    Table,
    Id,
    TaskId,
    StudentId,
    GraderId,
    Points,
    Feedback,
    GradedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TaskAppeals {
    #[sea_orm(iden = "task_appeals")]
    Table,
    Id,
    TaskId,
    StudentId,
    Reason,
    Status,
    Resolution,
    ResolvedBy,
    CreatedAt,
    ResolvedAt,
    PendingSlot,
}

#[derive(DeriveIden)]
enum PointEntries {
    #[sea_orm(iden = "point_entries")]
    Table,
    Id,
    StudentId,
    Source,
    Label,
    Points,
    AwardedBy,
    CreatedAt,
}
