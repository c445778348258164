use chrono::Utc;
use dishboard_protocol::{CreateDish, Dish};

pub fn create_body(dish_id: &str, dish_name: &str) -> CreateDish {
    CreateDish::new(dish_id, dish_name, format!("https://img.example/{dish_id}.jpg"))
}

pub fn sample_dish(dish_id: &str, dish_name: &str) -> Dish {
    let now = Utc::now();
    Dish {
        dish_id: dish_id.to_string(),
        dish_name: dish_name.to_string(),
        image_url: format!("https://img.example/{dish_id}.jpg"),
        is_published: false,
        created_at: now,
        updated_at: now,
    }
}
