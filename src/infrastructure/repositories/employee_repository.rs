//! SeaORM implementation of EmployeeRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{DomainError, Employee, EmployeeFilter, EmployeeInput, EmployeeRepository};
use crate::models::employee::{ActiveModel, Column, Entity as EmployeeEntity};

/// SeaORM-based implementation of EmployeeRepository
pub struct SeaOrmEmployeeRepository {
    db: DatabaseConnection,
}

impl SeaOrmEmployeeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeRepository for SeaOrmEmployeeRepository {
    async fn find_all(&self, filter: EmployeeFilter) -> Result<Vec<Employee>, DomainError> {
        let mut query = EmployeeEntity::find();

        if !filter.include_inactive.unwrap_or(false) {
            query = query.filter(Column::IsActive.eq(true));
        }
        if let Some(department) = filter.department
            && !department.is_empty()
        {
            query = query.filter(Column::Department.eq(department));
        }

        let employees = query.order_by_asc(Column::Name).all(&self.db).await?;
        Ok(employees.into_iter().map(Employee::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, DomainError> {
        Ok(EmployeeEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Employee::from))
    }

    async fn create(&self, input: EmployeeInput) -> Result<Employee, DomainError> {
        let input = input.normalize()?;
        let now = chrono::Utc::now().to_rfc3339();

        let new_employee = ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            department: Set(input.department),
            phone: Set(input.phone),
            notes: Set(input.notes),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_employee.insert(&self.db).await?;
        Ok(Employee::from(result))
    }

    async fn update(&self, id: i32, input: EmployeeInput) -> Result<Employee, DomainError> {
        let input = input.normalize()?;
        let existing = EmployeeEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name);
        active.email = Set(input.email);
        active.department = Set(input.department);
        active.phone = Set(input.phone);
        active.notes = Set(input.notes);
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(Employee::from(result))
    }

    async fn deactivate(&self, id: i32) -> Result<(), DomainError> {
        let existing = EmployeeEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.db).await?;

        Ok(())
    }
}
