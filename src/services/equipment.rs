//! Equipment service

use rust_decimal::Decimal;

use super::activity_log::ActivityLogService;
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        user::PageQuery,
        Actor,
    },
    policy::{authorize, Action},
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    activity: ActivityLogService,
}

impl EquipmentService {
    pub fn new(repository: Repository, activity: ActivityLogService) -> Self {
        Self { repository, activity }
    }

    pub async fn list(&self, actor: &Actor, page: &PageQuery) -> AppResult<(Vec<Equipment>, i64)> {
        authorize(actor, &Action::ViewEquipment)?;
        self.repository.equipment.list(page).await
    }

    pub async fn get_by_id(&self, actor: &Actor, id: i32) -> AppResult<Equipment> {
        authorize(actor, &Action::ViewEquipment)?;
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, actor: &Actor, data: &CreateEquipment) -> AppResult<Equipment> {
        authorize(actor, &Action::ManageEquipment)?;
        check_price(Some(data.unit_price))?;

        let equipment = self.repository.equipment.create(data).await?;
        self.activity.record(
            Some(actor.id),
            "CREATE_EQUIPMENT",
            format!("Added '{}' (stock {})", equipment.name, equipment.stock),
        );
        Ok(equipment)
    }

    pub async fn update(&self, actor: &Actor, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        authorize(actor, &Action::ManageEquipment)?;
        check_price(data.unit_price)?;

        let equipment = self.repository.equipment.update(id, data).await?;
        self.activity.record(
            Some(actor.id),
            "UPDATE_EQUIPMENT",
            format!("Updated '{}'", equipment.name),
        );
        Ok(equipment)
    }

    pub async fn delete(&self, actor: &Actor, id: i32) -> AppResult<()> {
        authorize(actor, &Action::ManageEquipment)?;
        self.repository.equipment.delete(id).await?;
        self.activity.record(Some(actor.id), "DELETE_EQUIPMENT", format!("Deleted equipment {}", id));
        Ok(())
    }
}

fn check_price(price: Option<Decimal>) -> AppResult<()> {
    match price {
        Some(p) if p < Decimal::ZERO => Err(AppError::Validation(
            "Unit price cannot be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_is_rejected() {
        assert!(check_price(Some(Decimal::new(-1, 0))).is_err());
        assert!(check_price(Some(Decimal::ZERO)).is_ok());
        assert!(check_price(Some(Decimal::from(750_000))).is_ok());
        assert!(check_price(None).is_ok());
    }
}
