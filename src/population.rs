//! A fixed-size arena of people addressed by [`PersonId`], double-buffered for the spread pass.
//!
//! Spreading must read every spreader as they were after this timestep's transitions and
//! before any spread, or someone infected early in the pass could pass the infection on in the
//! same timestep. [`Population::spread_buffers`] copies the live buffer into a second buffer of
//! the same indices; spreaders are read from the live buffer and receivers are written in the
//! second. [`Population::commit`] then swaps the buffers. Both buffers keep their allocation
//! for the whole run.
use crate::infection::Infection;
use crate::person::{Person, PersonId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Population {
    people: Vec<Person>,
    next: Vec<Person>,
}

impl Population {
    #[must_use]
    pub fn new(people: Vec<Person>) -> Self {
        let next = Vec::with_capacity(people.len());
        Population { people, next }
    }

    /// `size` people of whom the last `infected` carry a susceptible infection.
    #[must_use]
    pub fn seeded(size: usize, infected: usize) -> Self {
        let infected = infected.min(size);
        let people = std::iter::repeat_n(Person::new(), size - infected)
            .chain(std::iter::repeat_n(
                Person::with_infection(Infection::default()),
                infected,
            ))
            .collect();
        Population::new(people)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.people.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.people.get(id.index())
    }

    pub fn get_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.people.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PersonId, &Person)> {
        self.people
            .iter()
            .enumerate()
            .map(|(index, person)| (PersonId::new(index), person))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PersonId, &mut Person)> {
        self.people
            .iter_mut()
            .enumerate()
            .map(|(index, person)| (PersonId::new(index), person))
    }

    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Copies the live buffer into the snapshot buffer and returns both: the live people to
    /// read spreaders from and the snapshot to write receivers into.
    pub fn spread_buffers(&mut self) -> (&[Person], &mut [Person]) {
        self.next.clone_from(&self.people);
        (&self.people, &mut self.next)
    }

    /// Makes the snapshot the live population.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.people, &mut self.next);
    }
}

impl FromIterator<Person> for Population {
    fn from_iter<I: IntoIterator<Item = Person>>(iter: I) -> Self {
        Population::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_puts_infections_last() {
        let population = Population::seeded(5, 2);
        assert_eq!(population.len(), 5);
        let infected: Vec<usize> = population
            .iter()
            .filter(|(_, person)| person.is_infected())
            .map(|(id, _)| id.index())
            .collect();
        assert_eq!(infected, vec![3, 4]);
    }

    #[test]
    fn snapshot_writes_are_invisible_until_commit() {
        let mut population = Population::seeded(3, 1);
        {
            let (live, snapshot) = population.spread_buffers();
            assert_eq!(live, &*snapshot);
            snapshot[0].infect(Infection::default());
            assert!(!live[0].is_infected());
        }
        assert!(!population.get(PersonId::new(0)).unwrap().is_infected());

        population.commit();
        assert!(population.get(PersonId::new(0)).unwrap().is_infected());
        assert_eq!(population.len(), 3);
    }

    #[test]
    fn snapshot_is_refreshed_each_time() {
        let mut population = Population::seeded(2, 0);
        population.spread_buffers().1[1].die();
        population.commit();

        population.get_mut(PersonId::new(0)).unwrap().recover();
        let (live, snapshot) = population.spread_buffers();
        assert_eq!(live, &*snapshot);
        assert!(snapshot[0].is_immune());
        assert!(!snapshot[1].is_alive());
    }
}
