#[derive(Debug, Clone)]
pub struct TagItemDto {
    pub name: String,
    pub count: i64,
}
