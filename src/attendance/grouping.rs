use crate::models::{ClassGroup, Child, UNASSIGNED_CLASS_LABEL};

/// Groups children by class, keeping roster order inside each group.
/// Children without a class land in the "Sans classe" group. Groups are
/// sorted by label, ignoring case.
pub fn group_by_class(children: Vec<Child>) -> Vec<ClassGroup> {
    let mut groups: Vec<ClassGroup> = Vec::new();

    for child in children {
        let class_id = child.class_id().map(str::to_string);
        match groups.iter_mut().find(|g| g.id == class_id) {
            Some(group) => group.children.push(child),
            None => {
                let label = match &class_id {
                    Some(id) => child
                        .classe
                        .as_ref()
                        .map(|c| c.nom.trim())
                        .filter(|nom| !nom.is_empty())
                        .unwrap_or(id.as_str())
                        .to_string(),
                    None => UNASSIGNED_CLASS_LABEL.to_string(),
                };
                groups.push(ClassGroup {
                    id: class_id,
                    label,
                    children: vec![child],
                });
            }
        }
    }

    groups.sort_by_cached_key(|g| g.label.to_lowercase());
    groups
}
